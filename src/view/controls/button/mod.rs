//! Button control for triggering actions
//!
//! Renders as: `[ Button Text ]`

mod input;
mod render;

use unicode_width::UnicodeWidthStr;

use super::ElementBase;

/// State for a button control
#[derive(Debug, Clone)]
pub struct ButtonState {
    pub base: ElementBase,
    /// Button label text
    pub label: String,
}

impl ButtonState {
    /// Create a new button state
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            base: ElementBase::default(),
            label: label.into(),
        }
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    /// Width of "[ " + label + " ]"
    pub fn size(&self) -> (u16, u16) {
        ((self.label.width() + 4) as u16, 1)
    }
}
