//! Text box input handling

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Position;

use super::TextBoxState;
use crate::view::controls::{Capture, InputOutcome};

impl TextBoxState {
    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        match event {
            Event::Mouse(mouse) => {
                if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
                    return InputOutcome::IGNORED;
                }
                let inside = self.base.contains(Position::new(mouse.column, mouse.row));
                match (inside, self.editing) {
                    (true, false) => {
                        self.start_editing();
                        InputOutcome::consumed().with_capture(Capture::Acquire)
                    }
                    (true, true) => InputOutcome::consumed(),
                    // Losing focus commits; the click still reaches whatever is under it
                    (false, true) => InputOutcome {
                        consumed: false,
                        activated: self.commit(),
                        capture: Capture::Release,
                    },
                    (false, false) => InputOutcome::IGNORED,
                }
            }
            Event::Paste(text) if self.editing => {
                self.insert_str(text);
                InputOutcome::consumed()
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if !self.editing {
                    return if self.base.focused && key.code == KeyCode::Enter {
                        self.start_editing();
                        InputOutcome::consumed().with_capture(Capture::Acquire)
                    } else {
                        InputOutcome::IGNORED
                    };
                }

                match key.code {
                    KeyCode::Enter | KeyCode::Esc => self.finish(true),
                    KeyCode::Tab | KeyCode::BackTab => self.finish(false),
                    KeyCode::Backspace => {
                        self.backspace();
                        InputOutcome::consumed()
                    }
                    KeyCode::Delete => {
                        self.delete();
                        InputOutcome::consumed()
                    }
                    KeyCode::Left => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            self.move_home();
                        } else {
                            self.move_left();
                        }
                        InputOutcome::consumed()
                    }
                    KeyCode::Right => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            self.move_end();
                        } else {
                            self.move_right();
                        }
                        InputOutcome::consumed()
                    }
                    KeyCode::Home => {
                        self.move_home();
                        InputOutcome::consumed()
                    }
                    KeyCode::End => {
                        self.move_end();
                        InputOutcome::consumed()
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.insert(c);
                        InputOutcome::consumed()
                    }
                    _ => InputOutcome::consumed(),
                }
            }
            _ => InputOutcome::IGNORED,
        }
    }

    /// Commit and hand input back. Tab is left unconsumed so focus can move on.
    fn finish(&mut self, consume: bool) -> InputOutcome {
        InputOutcome {
            consumed: consume,
            activated: self.commit(),
            capture: Capture::Release,
        }
    }
}
