//! Checkbox input handling

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Position;

use super::CheckboxState;
use crate::view::controls::InputOutcome;

impl CheckboxState {
    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        let toggled = match event {
            Event::Mouse(mouse) => {
                matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                    && self.base.contains(Position::new(mouse.column, mouse.row))
            }
            Event::Key(key) => {
                key.kind != KeyEventKind::Release
                    && self.base.focused
                    && matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
            }
            _ => false,
        };

        if toggled {
            self.toggle();
            InputOutcome::activated()
        } else {
            InputOutcome::IGNORED
        }
    }
}
