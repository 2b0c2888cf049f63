//! Static text, optionally clickable
//!
//! Labels cover option names, section titles, paragraphs and page links. An
//! input-listener label shows the buttons bound to a keybind option and opens
//! the capture popup when clicked. A label can also hand its area to a draw
//! hook, which is how owners render custom option widgets.

use std::fmt;
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::{ElementBase, InputOutcome};
use crate::input::KeybindList;
use crate::view::theme::MenuTheme;

/// Draws custom content into the label's area
pub type DrawHook = Rc<dyn Fn(&mut Frame, Rect)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    #[default]
    Plain,
    Heading,
    Dim,
    /// Clickable text such as a page link
    Link,
}

/// State for a label
#[derive(Clone)]
pub struct LabelState {
    pub base: ElementBase,
    pub text: String,
    pub style: LabelStyle,
    /// Bound buttons, for keybind rows
    pub input_listener: Option<KeybindList>,
    pub draw_hook: Option<DrawHook>,
    /// Wrap to this many columns
    pub wrap_width: Option<u16>,
    /// Fixed height, used with draw hooks
    pub height: Option<u16>,
}

impl fmt::Debug for LabelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelState")
            .field("base", &self.base)
            .field("text", &self.text)
            .field("style", &self.style)
            .field("input_listener", &self.input_listener)
            .field("has_draw_hook", &self.draw_hook.is_some())
            .finish()
    }
}

impl LabelState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            base: ElementBase::default(),
            text: text.into(),
            style: LabelStyle::Plain,
            input_listener: None,
            draw_hook: None,
            wrap_width: None,
            height: None,
        }
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    pub fn with_style(mut self, style: LabelStyle) -> Self {
        self.style = style;
        self
    }

    pub fn wrapped(mut self, width: u16) -> Self {
        self.wrap_width = Some(width);
        self
    }

    /// Show the bound buttons of a keybind option
    pub fn listening(mut self, binds: KeybindList) -> Self {
        self.text = binds.to_string();
        self.input_listener = Some(binds);
        self
    }

    pub fn with_draw_hook(mut self, height: u16, hook: DrawHook) -> Self {
        self.height = Some(height);
        self.draw_hook = Some(hook);
        self
    }

    fn lines(&self) -> Vec<String> {
        match self.wrap_width {
            Some(width) => wrap(&self.text, width as usize),
            None => self.text.lines().map(str::to_string).collect(),
        }
    }

    pub fn size(&self) -> (u16, u16) {
        let lines = self.lines();
        let text_width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let width = self.wrap_width.unwrap_or(text_width).max(text_width);
        let height = self.height.unwrap_or(lines.len().max(1) as u16);
        (width, height)
    }

    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        if self.base.callback.is_none() {
            return InputOutcome::IGNORED;
        }
        match event {
            Event::Mouse(mouse)
                if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                    && self.base.contains(Position::new(mouse.column, mouse.row)) =>
            {
                InputOutcome::activated()
            }
            Event::Key(key)
                if key.kind != KeyEventKind::Release
                    && self.base.focused
                    && key.code == KeyCode::Enter =>
            {
                InputOutcome::activated()
            }
            _ => InputOutcome::IGNORED,
        }
    }

    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.is_empty() {
            return;
        }
        if let Some(hook) = &self.draw_hook {
            hook(frame, area);
            return;
        }

        let focus = self.base.focus_state();
        let style = match self.style {
            LabelStyle::Plain => theme.style(focus),
            LabelStyle::Heading => theme.heading_style(),
            LabelStyle::Dim => Style::default().fg(theme.disabled),
            LabelStyle::Link => theme.style(focus).add_modifier(Modifier::UNDERLINED),
        };
        let lines: Vec<Line> = self
            .lines()
            .into_iter()
            .map(|l| Line::styled(l, style))
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}

/// Greedy word wrap on display width
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.width() + 1 + word.width() > width {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push(line);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Keybind;
    use crate::view::controls::test_util::{mouse_down, render_rows};
    use crate::view::controls::Element;
    use std::cell::Cell;

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap("the quick brown fox", 10),
            vec!["the quick".to_string(), "brown fox".to_string()]
        );
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn test_wrapped_label_height() {
        let label = LabelState::new("one two three four").wrapped(8);
        assert_eq!(label.size(), (8, 3));
    }

    #[test]
    fn test_plain_label_ignores_clicks() {
        let mut label = LabelState::new("Text");
        label.base.bounds = Rect::new(0, 0, 4, 1);
        assert_eq!(label.handle_event(&mouse_down(1, 0)), InputOutcome::IGNORED);
    }

    #[test]
    fn test_listening_label_is_clickable() {
        let clicked = Rc::new(Cell::new(false));
        let flag = clicked.clone();
        let mut label = LabelState::new("").listening(KeybindList::single(Keybind::key(
            crossterm::event::KeyCode::F(2),
        )));
        assert_eq!(label.text, "F2");
        label.base.bounds = Rect::new(0, 0, 2, 1);
        label.base.callback = Some(Rc::new(move |_| flag.set(true)));
        let mut element = Element::Label(label);
        assert!(element.is_focusable());
        element.handle_input(&mouse_down(0, 0));
        assert!(clicked.get());
    }

    #[test]
    fn test_draw_hook_receives_area() {
        let seen = Rc::new(Cell::new(Rect::default()));
        let sink = seen.clone();
        let mut label =
            LabelState::new("ignored").with_draw_hook(2, Rc::new(move |_, area| sink.set(area)));
        label.base.bounds = Rect::new(1, 1, 5, 2);
        render_rows(10, 4, |f| label.render(f, &MenuTheme::default()));
        assert_eq!(seen.get(), Rect::new(1, 1, 5, 2));
    }
}
