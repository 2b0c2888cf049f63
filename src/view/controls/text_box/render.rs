//! Text box rendering

use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::TextBoxState;
use crate::view::theme::MenuTheme;

impl TextBoxState {
    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.height == 0 || area.width < 3 {
            return;
        }

        let focus = self.base.focus_state();
        let border_color = if self.editing {
            theme.focused
        } else {
            theme.frame(focus)
        };
        let inner_width = area.width.saturating_sub(2) as usize;

        // Keep the cursor visible by scrolling the text horizontally
        let cursor_visual_pos = self.value[..self.cursor.min(self.value.len())].width();
        let scroll = if self.editing {
            cursor_visual_pos.saturating_sub(inner_width.saturating_sub(1))
        } else {
            0
        };

        let mut visible_text = String::new();
        let mut pos = 0;
        for ch in self.value.chars() {
            let w = ch.width().unwrap_or(0);
            if pos + w <= scroll {
                pos += w;
                continue;
            }
            if pos - scroll + w > inner_width {
                break;
            }
            visible_text.push(ch);
            pos += w;
        }
        let padding = " ".repeat(inner_width.saturating_sub(visible_text.width()));

        let line = Line::from(vec![
            Span::styled("[", Style::default().fg(border_color)),
            Span::styled(format!("{visible_text}{padding}"), theme.style(focus)),
            Span::styled("]", Style::default().fg(border_color)),
        ]);
        frame.render_widget(Paragraph::new(line), Rect::new(area.x, area.y, area.width, 1));

        if self.editing {
            let cursor_x = area.x + 1 + (cursor_visual_pos - scroll) as u16;
            if cursor_x < area.x + area.width - 1 {
                if let Some(cell) = frame.buffer_mut().cell_mut(Position::new(cursor_x, area.y)) {
                    cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
                }
            }
        }
    }
}
