//! Choice picker
//!
//! Closed it reads `[Medium ▼]`; open, the choices are listed under it in the
//! overlay pass. While open it is the exclusive input target of its container.

mod input;
mod render;

use ratatui::layout::{Position, Rect};
use unicode_width::UnicodeWidthStr;

use super::{rect_contains, ElementBase};

const MAX_LABEL_WIDTH: usize = 30;

/// Choices listed at once; longer lists scroll
const POPUP_ROWS: usize = 5;

/// Bookkeeping for the open choice list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoicePopup {
    /// Selection restored when the popup is dismissed
    pub restore: usize,
    /// First choice shown
    pub first_row: usize,
    pub hovered: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DropdownState {
    pub base: ElementBase,
    /// Values written back to the option
    pub choices: Vec<String>,
    /// Text shown for each choice, parallel to `choices`
    pub labels: Vec<String>,
    pub selected: usize,
    pub popup: Option<ChoicePopup>,
}

impl DropdownState {
    pub fn new(choices: Vec<String>) -> Self {
        Self {
            base: ElementBase::default(),
            labels: choices.clone(),
            choices,
            selected: 0,
            popup: None,
        }
    }

    /// Show each choice through `format` instead of its raw value
    pub fn formatted(choices: Vec<String>, format: impl Fn(&str) -> String) -> Self {
        let labels = choices.iter().map(|c| format(c)).collect();
        Self {
            labels,
            ..Self::new(choices)
        }
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    /// Preselect `value`; unknown values leave the first choice selected
    pub fn with_value(mut self, value: &str) -> Self {
        if let Some(index) = self.choices.iter().position(|c| c == value) {
            self.selected = index;
        }
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.choices.get(self.selected).map(String::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.labels.get(self.selected).map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.popup.is_some()
    }

    /// "[" + label + " ▼]"
    pub fn size(&self) -> (u16, u16) {
        let widest = self
            .labels
            .iter()
            .map(|l| l.width())
            .max()
            .unwrap_or(0)
            .clamp(1, MAX_LABEL_WIDTH);
        ((widest + 4) as u16, 1)
    }

    pub fn open(&mut self) {
        self.popup = Some(ChoicePopup {
            restore: self.selected,
            first_row: 0,
            hovered: None,
        });
        self.reveal_selected();
    }

    /// Close and put the selection back
    pub fn cancel(&mut self) {
        if let Some(popup) = self.popup.take() {
            self.selected = popup.restore;
        }
    }

    /// Close keeping the selection. Returns true if it differs from when the
    /// popup opened.
    pub fn confirm(&mut self) -> bool {
        self.popup
            .take()
            .is_some_and(|popup| popup.restore != self.selected)
    }

    /// Move the selection by `delta`, wrapping at both ends
    pub fn step(&mut self, delta: isize) {
        let len = self.choices.len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
        self.reveal_selected();
    }

    fn reveal_selected(&mut self) {
        let selected = self.selected;
        let Some(popup) = self.popup.as_mut() else {
            return;
        };
        if selected < popup.first_row {
            popup.first_row = selected;
        } else if selected >= popup.first_row + POPUP_ROWS {
            popup.first_row = selected + 1 - POPUP_ROWS;
        }
    }

    pub fn scroll_popup(&mut self, delta: isize) {
        let last_first_row = self.choices.len().saturating_sub(POPUP_ROWS);
        if let Some(popup) = self.popup.as_mut() {
            popup.first_row = popup
                .first_row
                .saturating_add_signed(delta)
                .min(last_first_row);
        }
    }

    /// Where the open list is drawn, directly under the closed box
    pub fn popup_area(&self) -> Rect {
        let bounds = self.base.bounds;
        let rows = self.choices.len().min(POPUP_ROWS) as u16;
        Rect::new(bounds.x, bounds.y.saturating_add(1), bounds.width, rows)
    }

    /// Choice under `pos` in the open list
    pub fn choice_at(&self, pos: Position) -> Option<usize> {
        let popup = self.popup?;
        let area = self.popup_area();
        let index = popup.first_row + pos.y.checked_sub(area.y)? as usize;
        (rect_contains(area, pos) && index < self.choices.len()).then_some(index)
    }

    pub(crate) fn track_hover(&mut self, cursor: Option<Position>) {
        let hovered = cursor.and_then(|pos| self.choice_at(pos));
        if let Some(popup) = self.popup.as_mut() {
            popup.hovered = hovered;
        }
    }
}
