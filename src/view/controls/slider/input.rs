//! Slider input handling

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Position;

use super::SliderState;
use crate::view::controls::InputOutcome;

impl SliderState {
    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left)
                    if self.base.contains(Position::new(mouse.column, mouse.row)) =>
                {
                    self.dragging = true;
                    self.changed_outcome(self.value_at_column(mouse.column))
                }
                MouseEventKind::Up(MouseButton::Left) if self.dragging => {
                    self.dragging = false;
                    InputOutcome::consumed()
                }
                _ => InputOutcome::IGNORED,
            },
            Event::Key(key) if key.kind != KeyEventKind::Release && self.base.focused => {
                match key.code {
                    KeyCode::Left => self.changed_outcome(self.value - self.key_step()),
                    KeyCode::Right => self.changed_outcome(self.value + self.key_step()),
                    KeyCode::Home => self.changed_outcome(self.min),
                    KeyCode::End => self.changed_outcome(self.max),
                    _ => InputOutcome::IGNORED,
                }
            }
            _ => InputOutcome::IGNORED,
        }
    }

    fn changed_outcome(&mut self, value: f64) -> InputOutcome {
        if self.set_value(value) {
            InputOutcome::activated()
        } else {
            InputOutcome::consumed()
        }
    }
}
