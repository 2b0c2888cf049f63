//! Input vocabulary shared by widgets, keybind options and the host glue
//!
//! Keyboard and mouse events arrive as crossterm events. A keybind is a chord
//! of `InputButton`s; options store a `KeybindList` (any chord triggers).

use std::fmt;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode, MouseButton,
    MouseEventKind,
};
use ratatui::layout::Position;
use serde::{Deserialize, Serialize};

/// A single physical button: a keyboard key or a mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputButton {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl InputButton {
    /// Whether this button is a modifier key (held while pressing the "real" key)
    pub fn is_modifier(&self) -> bool {
        matches!(self, InputButton::Key(KeyCode::Modifier(_)))
    }

    /// Modifier buttons implied by the modifier flags of a key event
    pub fn from_modifiers(modifiers: KeyModifiers) -> Vec<InputButton> {
        let mut buttons = Vec::new();
        if modifiers.contains(KeyModifiers::CONTROL) {
            buttons.push(InputButton::Key(KeyCode::Modifier(ModifierKeyCode::LeftControl)));
        }
        if modifiers.contains(KeyModifiers::ALT) {
            buttons.push(InputButton::Key(KeyCode::Modifier(ModifierKeyCode::LeftAlt)));
        }
        if modifiers.contains(KeyModifiers::SHIFT) {
            buttons.push(InputButton::Key(KeyCode::Modifier(ModifierKeyCode::LeftShift)));
        }
        buttons
    }

    /// Treat left and right variants of a modifier as the same button
    pub fn normalized(self) -> InputButton {
        use ModifierKeyCode::*;
        match self {
            InputButton::Key(KeyCode::Modifier(m)) => InputButton::Key(KeyCode::Modifier(match m {
                RightControl => LeftControl,
                RightAlt => LeftAlt,
                RightShift => LeftShift,
                RightSuper => LeftSuper,
                other => other,
            })),
            other => other,
        }
    }
}

impl fmt::Display for InputButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputButton::Key(code) => match code {
                KeyCode::Char(' ') => write!(f, "Space"),
                KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
                KeyCode::F(n) => write!(f, "F{n}"),
                KeyCode::Modifier(m) => match m {
                    ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => {
                        write!(f, "Ctrl")
                    }
                    ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => write!(f, "Alt"),
                    ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => write!(f, "Shift"),
                    other => write!(f, "{other:?}"),
                },
                KeyCode::Esc => write!(f, "Esc"),
                KeyCode::BackTab => write!(f, "Shift+Tab"),
                other => write!(f, "{other:?}"),
            },
            InputButton::Mouse(button) => match button {
                MouseButton::Left => write!(f, "MouseLeft"),
                MouseButton::Right => write!(f, "MouseRight"),
                MouseButton::Middle => write!(f, "MouseMiddle"),
            },
        }
    }
}

/// A chord: every button must be held for the keybind to trigger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Keybind {
    pub buttons: Vec<InputButton>,
}

impl Keybind {
    pub fn new(buttons: Vec<InputButton>) -> Self {
        Self { buttons }
    }

    pub fn key(code: KeyCode) -> Self {
        Self::new(vec![InputButton::Key(code)])
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Check whether this chord is satisfied by the given set of pressed buttons
    pub fn is_satisfied_by(&self, pressed: &[InputButton]) -> bool {
        if self.buttons.is_empty() {
            return false;
        }
        let pressed: Vec<InputButton> = pressed.iter().map(|b| b.normalized()).collect();
        self.buttons
            .iter()
            .all(|b| pressed.contains(&b.normalized()))
    }
}

impl fmt::Display for Keybind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, button) in self.buttons.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{button}")?;
        }
        Ok(())
    }
}

/// A set of alternative chords; any of them triggers the binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeybindList(pub Vec<Keybind>);

impl KeybindList {
    pub fn new(binds: Vec<Keybind>) -> Self {
        Self(binds.into_iter().filter(|b| !b.is_empty()).collect())
    }

    pub fn single(bind: Keybind) -> Self {
        Self::new(vec![bind])
    }

    pub fn is_bound(&self) -> bool {
        self.0.iter().any(|b| !b.is_empty())
    }

    pub fn binds(&self) -> &[Keybind] {
        &self.0
    }

    /// Whether `pressed` (the buttons down right now, newest last) completes any chord.
    /// The newest button must belong to the chord so holding a chord does not re-trigger
    /// on unrelated presses.
    pub fn just_pressed(&self, pressed: &[InputButton]) -> bool {
        let Some(newest) = pressed.last().map(|b| b.normalized()) else {
            return false;
        };
        self.0.iter().any(|bind| {
            bind.is_satisfied_by(pressed)
                && bind.buttons.iter().any(|b| b.normalized() == newest)
        })
    }
}

impl fmt::Display for KeybindList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_bound() {
            return write!(f, "None");
        }
        for (i, bind) in self.0.iter().filter(|b| !b.is_empty()).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bind}")?;
        }
        Ok(())
    }
}

/// Pointer state sampled once per frame by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Cursor position in viewport cells (None when the pointer is outside)
    pub cursor: Option<Position>,
    /// Whether the primary (left) button is currently held
    pub primary_held: bool,
}

impl FrameInput {
    pub fn at(x: u16, y: u16) -> Self {
        Self {
            cursor: Some(Position::new(x, y)),
            primary_held: false,
        }
    }

    pub fn held(mut self) -> Self {
        self.primary_held = true;
        self
    }
}

/// The buttons a key event represents, modifiers first. A modifier key
/// sets its own flag, which is not counted a second time.
pub fn key_chord(key: &KeyEvent) -> Vec<InputButton> {
    let main = InputButton::Key(key.code);
    let mut buttons = InputButton::from_modifiers(key.modifiers);
    buttons.retain(|b| *b != main.normalized());
    buttons.push(main);
    buttons
}

/// The button pressed by this event, if it is a press
pub fn pressed_button(event: &Event) -> Option<InputButton> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(InputButton::Key(key.code)),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(button) => Some(InputButton::Mouse(button)),
            _ => None,
        },
        _ => None,
    }
}

/// The chord a press event completes, pressed button last. Key events carry
/// their held modifiers as flags; mouse presses stand alone.
pub fn pressed_chord(event: &Event) -> Option<Vec<InputButton>> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(key_chord(key)),
        _ => pressed_button(event).map(|button| vec![button]),
    }
}

/// The button released by this event, if it is a release
pub fn released_button(event: &Event) -> Option<InputButton> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Release => Some(InputButton::Key(key.code)),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Up(button) => Some(InputButton::Mouse(button)),
            _ => None,
        },
        _ => None,
    }
}

/// Pointer position carried by a mouse event
pub fn pointer_position(event: &Event) -> Option<Position> {
    match event {
        Event::Mouse(mouse) => Some(Position::new(mouse.column, mouse.row)),
        _ => None,
    }
}
