use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{DropdownState, POPUP_ROWS};
use crate::view::theme::MenuTheme;

/// Truncate or pad `text` to exactly `width` columns
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(&" ".repeat(width.saturating_sub(out.width())));
    out
}

impl DropdownState {
    pub fn render(&self, frame: &mut Frame, theme: &MenuTheme) {
        let area = self.base.bounds.intersection(frame.area());
        if area.height == 0 || area.width < 5 {
            return;
        }

        let focus = self.base.focus_state();
        let frame_style = Style::default().fg(theme.frame(focus));
        let arrow = if self.is_open() { "▲" } else { "▼" };
        let line = Line::from(vec![
            Span::styled("[", frame_style),
            Span::styled(
                fit(self.label().unwrap_or(""), area.width as usize - 4),
                theme.style(focus),
            ),
            Span::raw(" "),
            Span::styled(arrow, frame_style),
            Span::styled("]", frame_style),
        ]);
        frame.render_widget(Paragraph::new(line), Rect::new(area.x, area.y, area.width, 1));
    }

    /// Draw the open choice list over whatever is below the box
    pub fn render_popup(&self, frame: &mut Frame, theme: &MenuTheme) {
        let Some(popup) = self.popup else {
            return;
        };
        let area = self.popup_area().intersection(frame.area());
        if area.height == 0 || area.width < 3 {
            return;
        }
        frame.render_widget(Clear, area);

        let more_above = popup.first_row > 0;
        let more_below = popup.first_row + POPUP_ROWS < self.choices.len();
        let text_width = area.width.saturating_sub(2) as usize;

        for (row, index) in (popup.first_row..self.choices.len())
            .take(area.height as usize)
            .enumerate()
        {
            let fg = if index == self.selected {
                theme.accent
            } else if popup.hovered == Some(index) {
                theme.hovered
            } else {
                theme.text
            };
            let marker = match row {
                0 if more_above => "↑",
                r if r + 1 == area.height as usize && more_below => "↓",
                _ => " ",
            };
            let text = format!("{marker}{} ", fit(&self.labels[index], text_width));
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(fg).bg(theme.popup_bg))),
                Rect::new(area.x, area.y + row as u16, area.width, 1),
            );
        }
    }
}
