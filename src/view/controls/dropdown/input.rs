use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Position;

use super::DropdownState;
use crate::view::controls::{Capture, InputOutcome};

const WHEEL_ROWS: isize = 3;

impl DropdownState {
    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.click(Position::new(mouse.column, mouse.row))
                }
                _ if !self.is_open() => InputOutcome::IGNORED,
                MouseEventKind::ScrollUp => {
                    self.scroll_popup(-WHEEL_ROWS);
                    InputOutcome::consumed()
                }
                MouseEventKind::ScrollDown => {
                    self.scroll_popup(WHEEL_ROWS);
                    InputOutcome::consumed()
                }
                _ => InputOutcome::consumed(),
            },
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                let open = self.is_open();
                match key.code {
                    _ if !open && !self.base.focused => InputOutcome::IGNORED,
                    KeyCode::Enter | KeyCode::Char(' ') if open => self.finish(),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        self.open();
                        InputOutcome::consumed().with_capture(Capture::Acquire)
                    }
                    KeyCode::Esc if open => {
                        self.cancel();
                        InputOutcome::consumed().with_capture(Capture::Release)
                    }
                    KeyCode::Up | KeyCode::Down => {
                        self.step(if key.code == KeyCode::Up { -1 } else { 1 });
                        // Closed, arrows change the value directly
                        if open {
                            InputOutcome::consumed()
                        } else {
                            InputOutcome::activated()
                        }
                    }
                    _ if open => InputOutcome::consumed(),
                    _ => InputOutcome::IGNORED,
                }
            }
            _ => InputOutcome::IGNORED,
        }
    }

    fn click(&mut self, pos: Position) -> InputOutcome {
        if !self.is_open() {
            if !self.base.contains(pos) {
                return InputOutcome::IGNORED;
            }
            self.open();
            return InputOutcome::consumed().with_capture(Capture::Acquire);
        }

        if let Some(index) = self.choice_at(pos) {
            self.selected = index;
            return self.finish();
        }
        if self.base.contains(pos) {
            return self.finish();
        }
        // Outside the popup: dismiss, and swallow the click
        self.cancel();
        InputOutcome::consumed().with_capture(Capture::Release)
    }

    fn finish(&mut self) -> InputOutcome {
        let outcome = if self.confirm() {
            InputOutcome::activated()
        } else {
            InputOutcome::consumed()
        };
        outcome.with_capture(Capture::Release)
    }
}
