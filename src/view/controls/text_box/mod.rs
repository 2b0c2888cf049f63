//! Text box control for free-form and numeric text
//!
//! Renders as: `[text here          ]`
//!
//! Clicking the box (or Enter while focused) starts editing and makes the box
//! the container's exclusive input target. Editing ends on Enter, Esc, Tab,
//! an outside click or menu close; in every case the current text is kept.

mod input;
mod render;

use std::fmt;
use std::rc::Rc;

use super::ElementBase;

/// Default width of the editable field, excluding brackets
pub const DEFAULT_FIELD_WIDTH: u16 = 20;

/// Decides which typed characters are accepted
pub type CharFilter = Rc<dyn Fn(char) -> bool>;

/// State for a text box control
#[derive(Clone)]
pub struct TextBoxState {
    pub base: ElementBase,
    /// Current text
    pub value: String,
    /// Cursor position (byte offset in value)
    pub cursor: usize,
    /// Whether keystrokes currently edit the text
    pub editing: bool,
    /// Text when editing started
    original: String,
    pub filter: Option<CharFilter>,
    pub field_width: u16,
}

impl fmt::Debug for TextBoxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBoxState")
            .field("base", &self.base)
            .field("value", &self.value)
            .field("cursor", &self.cursor)
            .field("editing", &self.editing)
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

impl TextBoxState {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            base: ElementBase::default(),
            cursor: value.len(),
            original: value.clone(),
            value,
            editing: false,
            filter: None,
            field_width: DEFAULT_FIELD_WIDTH,
        }
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    /// Only accept characters the filter approves
    pub fn with_filter(mut self, filter: impl Fn(char) -> bool + 'static) -> Self {
        self.filter = Some(Rc::new(filter));
        self
    }

    /// Accepts digits, sign, and (for floats) a decimal point and exponent
    pub fn numeric(self, allow_fraction: bool) -> Self {
        self.with_filter(move |c| {
            c.is_ascii_digit()
                || c == '-'
                || c == '+'
                || (allow_fraction && matches!(c, '.' | 'e' | 'E'))
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.field_width + 2, 1)
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        self.original = self.value.clone();
        self.cursor = self.value.len();
    }

    /// Stop editing, keeping the current text. Returns true if the text changed.
    pub fn commit(&mut self) -> bool {
        if !self.editing {
            return false;
        }
        self.editing = false;
        self.value != self.original
    }

    fn accepts(&self, c: char) -> bool {
        !c.is_control() && self.filter.as_ref().map_or(true, |filter| filter(c))
    }

    /// Insert a character at the cursor position
    pub fn insert(&mut self, c: char) {
        if self.accepts(c) {
            self.value.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    /// Insert every accepted character of a pasted string
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert(c);
        }
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if let Some(prev) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.value[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }
}
