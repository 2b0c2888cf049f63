//! Checkbox rendering

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::CheckboxState;
use crate::view::controls::FocusState;
use crate::view::theme::MenuTheme;

impl CheckboxState {
    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.height == 0 || area.width < 3 {
            return;
        }

        let focus = self.base.focus_state();
        let bracket = Style::default().fg(theme.frame(focus));
        let mark = if focus == FocusState::Disabled {
            Style::default().fg(theme.disabled)
        } else {
            Style::default().fg(theme.accent)
        };

        let line = Line::from(vec![
            Span::styled("[", bracket),
            Span::styled(if self.checked { "x" } else { " " }, mark),
            Span::styled("]", bracket),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}
