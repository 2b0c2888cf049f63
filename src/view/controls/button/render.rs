//! Button rendering functions

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::ButtonState;
use crate::view::controls::FocusState;
use crate::view::theme::MenuTheme;

impl ButtonState {
    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.height == 0 || area.width < 4 {
            return;
        }

        let focus = self.base.focus_state();
        let mut style = theme.style(focus);
        if focus == FocusState::Focused {
            style = style.add_modifier(Modifier::BOLD);
        }
        let bracket = Style::default().fg(theme.frame(focus));

        // Truncate label if needed
        let max_label_len = area.width.saturating_sub(4) as usize;
        let display_label: String = self.label.chars().take(max_label_len).collect();

        let line = Line::from(vec![
            Span::styled("[", bracket),
            Span::raw(" "),
            Span::styled(display_label, style),
            Span::raw(" "),
            Span::styled("]", bracket),
        ]);
        frame.render_widget(Paragraph::new(line), Rect::new(area.x, area.y, area.width, 1));
    }
}
