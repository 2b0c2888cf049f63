//! Keybind capture popup rendering

use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use rust_i18n::t;

use super::KeybindEditorState;
use crate::input::Keybind;
use crate::view::theme::MenuTheme;

impl KeybindEditorState {
    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.height < 3 || area.width < 10 {
            return;
        }
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.focused))
            .style(Style::default().bg(theme.popup_bg))
            .title(format!(" {}: {} ", t!("keybind_editor.title"), self.title));

        let recorded = Keybind::new(self.recorded.clone()).to_string();
        let lines = vec![
            Line::styled(
                t!("keybind_editor.prompt").to_string(),
                Style::default().fg(theme.text),
            ),
            Line::styled(
                t!("keybind_editor.recorded", buttons = recorded).to_string(),
                Style::default().fg(theme.accent),
            ),
            Line::styled(
                t!("keybind_editor.hint").to_string(),
                Style::default().fg(theme.disabled),
            ),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center),
            area,
        );
    }
}
