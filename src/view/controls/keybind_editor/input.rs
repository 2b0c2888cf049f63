//! Keybind capture input handling

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};

use super::KeybindEditorState;
use crate::input::{key_chord, released_button, InputButton};
use crate::view::controls::{Capture, InputOutcome};

impl KeybindEditorState {
    /// Every event is consumed while capturing
    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        if !self.is_capturing() {
            return InputOutcome::IGNORED;
        }

        let complete = match event {
            Event::Key(key) if key.kind == KeyEventKind::Release => {
                self.released(released_button(event))
            }
            Event::Key(key) if key.code == KeyCode::Esc => {
                self.cancel();
                return Self::done();
            }
            Event::Key(key) => key_chord(key)
                .into_iter()
                .fold(false, |complete, button| self.record(button) | complete),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(button) => self.record(InputButton::Mouse(button))
                    && self.recorded.len() >= self.max_chord,
                MouseEventKind::Up(_) => self.released(released_button(event)),
                _ => false,
            },
            _ => false,
        };

        if complete {
            self.complete();
            Self::done()
        } else {
            InputOutcome::consumed()
        }
    }

    fn released(&self, button: Option<InputButton>) -> bool {
        button.is_some_and(|b| self.recorded.contains(&b))
    }

    fn done() -> InputOutcome {
        InputOutcome::activated().with_capture(Capture::Release)
    }
}
