//! Keybind capture control
//!
//! A modal popup that records the next button presses as one chord. The
//! target option is not touched while capturing; the owner of the editor
//! reads `outcome` once it is set and writes the new list (or nothing, when
//! cancelled).

mod input;
mod render;

use super::ElementBase;
use crate::input::{InputButton, Keybind, KeybindList};

/// Longest chord recorded before capture completes on its own
pub const DEFAULT_MAX_CHORD: usize = 4;

/// How a capture session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResult {
    Captured(KeybindList),
    Cancelled,
}

/// State for a keybind capture popup
#[derive(Debug, Clone)]
pub struct KeybindEditorState {
    pub base: ElementBase,
    /// Name of the option being rebound
    pub title: String,
    /// Value before capture started
    pub original: KeybindList,
    /// Buttons pressed so far, in press order
    pub recorded: Vec<InputButton>,
    pub max_chord: usize,
    /// Set once capture completes or is aborted
    pub outcome: Option<CaptureResult>,
}

impl KeybindEditorState {
    pub fn new(title: impl Into<String>, original: KeybindList) -> Self {
        Self {
            base: ElementBase::default(),
            title: title.into(),
            original,
            recorded: Vec::new(),
            max_chord: DEFAULT_MAX_CHORD,
            outcome: None,
        }
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    pub fn is_capturing(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn size(&self) -> (u16, u16) {
        (44, 6)
    }

    /// Record a pressed button. Returns true when the chord is complete.
    pub fn record(&mut self, button: InputButton) -> bool {
        let normalized = button.normalized();
        if !self.recorded.iter().any(|b| b.normalized() == normalized) {
            self.recorded.push(button);
        }
        !button.is_modifier() || self.recorded.len() >= self.max_chord
    }

    pub fn complete(&mut self) {
        let list = KeybindList::single(Keybind::new(std::mem::take(&mut self.recorded)));
        self.outcome = Some(CaptureResult::Captured(list));
    }

    pub fn cancel(&mut self) {
        self.recorded.clear();
        self.outcome = Some(CaptureResult::Cancelled);
    }

    /// The value the target option should end up with
    pub fn resulting_value(&self) -> &KeybindList {
        match &self.outcome {
            Some(CaptureResult::Captured(list)) => list,
            _ => &self.original,
        }
    }
}
