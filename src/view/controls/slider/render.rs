//! Slider rendering

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::{SliderState, TRACK_WIDTH};
use crate::view::controls::FocusState;
use crate::view::theme::MenuTheme;

impl SliderState {
    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.height == 0 || area.width < TRACK_WIDTH + 2 {
            return;
        }

        let focus = self.base.focus_state();
        let frame_style = Style::default().fg(theme.frame(focus));
        let handle_style = if focus == FocusState::Disabled {
            Style::default().fg(theme.disabled)
        } else {
            Style::default().fg(theme.accent)
        };

        let handle = self.handle_offset() as usize;
        let before = "─".repeat(handle);
        let after = "─".repeat((TRACK_WIDTH as usize).saturating_sub(handle + 1));

        let line = Line::from(vec![
            Span::styled("[", frame_style),
            Span::styled(before, frame_style),
            Span::styled("●", handle_style),
            Span::styled(after, frame_style),
            Span::styled("]", frame_style),
            Span::raw(" "),
            Span::styled(self.display_value(), theme.style(focus)),
        ]);
        frame.render_widget(Paragraph::new(line), Rect::new(area.x, area.y, area.width, 1));
    }
}
