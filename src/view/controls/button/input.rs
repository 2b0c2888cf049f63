//! Button input handling

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Position;

use super::ButtonState;
use crate::view::controls::InputOutcome;

impl ButtonState {
    /// Activates on a left press inside the button, or Enter/Space while focused
    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left)
                    if self.base.contains(Position::new(mouse.column, mouse.row)) =>
                {
                    InputOutcome::activated()
                }
                _ => InputOutcome::IGNORED,
            },
            Event::Key(key) if key.kind != KeyEventKind::Release && self.base.focused => {
                match key.code {
                    KeyCode::Enter | KeyCode::Char(' ') => InputOutcome::activated(),
                    _ => InputOutcome::IGNORED,
                }
            }
            _ => InputOutcome::IGNORED,
        }
    }
}
