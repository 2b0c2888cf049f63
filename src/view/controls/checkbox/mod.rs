//! Checkbox control for boolean values
//!
//! Renders as: `[x]` or `[ ]`. The option name is drawn by a separate label
//! in the row, so the checkbox itself carries no text.

mod input;
mod render;

use super::ElementBase;

/// State for a checkbox control
#[derive(Debug, Clone)]
pub struct CheckboxState {
    pub base: ElementBase,
    /// Current value
    pub checked: bool,
}

impl CheckboxState {
    pub fn new(checked: bool) -> Self {
        Self {
            base: ElementBase::default(),
            checked,
        }
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    /// Toggle the value
    pub fn toggle(&mut self) {
        self.checked = !self.checked;
    }

    pub fn size(&self) -> (u16, u16) {
        (3, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::controls::test_util::{key, mouse_down, render_rows};
    use crate::view::controls::Element;
    use crate::view::theme::MenuTheme;
    use crossterm::event::KeyCode;
    use ratatui::layout::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn placed(checked: bool) -> CheckboxState {
        let mut state = CheckboxState::new(checked);
        state.base.bounds = Rect::new(1, 0, 3, 1);
        state
    }

    #[test]
    fn test_checkbox_renders_both_states() {
        let theme = MenuTheme::default();
        let on = placed(true);
        let off = placed(false);
        assert_eq!(render_rows(5, 1, |f| on.render(f, &theme))[0], " [x] ");
        assert_eq!(render_rows(5, 1, |f| off.render(f, &theme))[0], " [ ] ");
    }

    #[test]
    fn test_click_toggles_and_reports_new_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut state = placed(false);
        state.base.callback = Some(Rc::new(move |element| {
            if let Element::Checkbox(cb) = element {
                sink.borrow_mut().push(cb.checked);
            }
        }));
        let mut element = Element::Checkbox(state);

        element.handle_input(&mouse_down(2, 0));
        element.handle_input(&mouse_down(2, 0));
        element.handle_input(&mouse_down(8, 0));
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_space_toggles_when_focused() {
        let mut state = placed(false);
        state.base.focused = true;
        assert!(state.handle_event(&key(KeyCode::Char(' '))).activated);
        assert!(state.checked);
    }
}
