//! Colors used by the menu controls

use ratatui::style::{Color, Modifier, Style};

use super::controls::FocusState;

/// Palette shared by every control in a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuTheme {
    /// Regular text
    pub text: Color,
    /// Brackets, borders and slider tracks
    pub border: Color,
    /// Accent for checkmarks, slider handles and selected values
    pub accent: Color,
    /// Keyboard focus highlight
    pub focused: Color,
    /// Mouse hover highlight
    pub hovered: Color,
    /// Disabled controls and "unavailable" values
    pub disabled: Color,
    /// Background of popups (dropdown lists, keybind capture)
    pub popup_bg: Color,
    /// Section titles and screen headers
    pub heading: Color,
    /// Tooltip line
    pub tooltip: Color,
}

impl Default for MenuTheme {
    fn default() -> Self {
        Self {
            text: Color::White,
            border: Color::Gray,
            accent: Color::Green,
            focused: Color::Cyan,
            hovered: Color::LightBlue,
            disabled: Color::DarkGray,
            popup_bg: Color::Black,
            heading: Color::Yellow,
            tooltip: Color::Gray,
        }
    }
}

impl MenuTheme {
    /// Foreground color for a control in the given focus state
    pub fn fg(&self, focus: FocusState) -> Color {
        match focus {
            FocusState::Normal => self.text,
            FocusState::Focused => self.focused,
            FocusState::Hovered => self.hovered,
            FocusState::Disabled => self.disabled,
        }
    }

    /// Bracket/border color for a control in the given focus state
    pub fn frame(&self, focus: FocusState) -> Color {
        match focus {
            FocusState::Normal => self.border,
            FocusState::Disabled => self.disabled,
            other => self.fg(other),
        }
    }

    pub fn style(&self, focus: FocusState) -> Style {
        Style::default().fg(self.fg(focus))
    }

    pub fn heading_style(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }
}
