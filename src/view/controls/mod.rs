//! UI controls for the configuration menu
//!
//! Each control lives in its own module with:
//! - State management (`ButtonState`, `CheckboxState`, ...)
//! - Input handling (`handle_event`)
//! - Rendering (`render`)
//!
//! `Element` is the closed set of controls stored in the widget tree. Drawing,
//! input routing and screen-reader announcements all match over it
//! exhaustively, so adding a control means extending every one of them.

pub mod button;
pub mod checkbox;
pub mod dropdown;
pub mod keybind_editor;
pub mod label;
pub mod slider;
pub mod text_box;

use std::fmt;
use std::rc::Rc;

use crossterm::event::Event;
use ratatui::layout::{Position, Rect};
use ratatui::Frame;

pub use button::ButtonState;
pub use checkbox::CheckboxState;
pub use dropdown::DropdownState;
pub use keybind_editor::{CaptureResult, KeybindEditorState};
pub use label::{DrawHook, LabelState, LabelStyle};
pub use slider::{Numeric, SliderState};
pub use text_box::TextBoxState;

use super::theme::MenuTheme;
use crate::input::FrameInput;

/// Focus state for controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Normal,
    Focused,
    Hovered,
    Disabled,
}

/// Invoked with the element after it was activated or its value changed
pub type Callback = Rc<dyn Fn(&Element)>;

/// Distance from one viewport edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Offset from the left/top edge
    Start(u16),
    /// Offset from the right/bottom edge (measured to the element's far side)
    End(u16),
}

/// Keeps an element at a fixed distance from viewport edges across resizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: Edge,
    pub y: Edge,
}

impl Anchor {
    pub fn bottom_left(left: u16, bottom: u16) -> Self {
        Self {
            x: Edge::Start(left),
            y: Edge::End(bottom),
        }
    }

    pub fn bottom_right(right: u16, bottom: u16) -> Self {
        Self {
            x: Edge::End(right),
            y: Edge::End(bottom),
        }
    }

    /// Local position for an element of `size` inside `viewport`.
    /// Depends only on its inputs, so resolving twice gives the same answer.
    pub fn resolve(&self, viewport: Rect, size: (u16, u16)) -> Position {
        let resolve_axis = |edge: Edge, extent: u16, len: u16| match edge {
            Edge::Start(offset) => offset,
            Edge::End(offset) => extent.saturating_sub(offset.saturating_add(len)),
        };
        Position::new(
            resolve_axis(self.x, viewport.width, size.0),
            resolve_axis(self.y, viewport.height, size.1),
        )
    }
}

/// State shared by every control
#[derive(Clone)]
pub struct ElementBase {
    /// Position relative to the container's origin
    pub local_position: Position,
    /// Absolute bounds, computed by the container during layout
    pub bounds: Rect,
    pub visible: bool,
    pub hovered: bool,
    pub focused: bool,
    pub enabled: bool,
    pub callback: Option<Callback>,
    /// Label spoken by the screen reader
    pub screen_reader_text: Option<String>,
    /// Extra text spoken after the label
    pub screen_reader_description: Option<String>,
    pub screen_reader_ignore: bool,
    pub tooltip: Option<String>,
    pub anchor: Option<Anchor>,
    /// Moves with the container's scroll row
    pub scrolls: bool,
    /// Scrolled outside the container's body region
    pub(crate) clipped: bool,
}

impl Default for ElementBase {
    fn default() -> Self {
        Self {
            local_position: Position::default(),
            bounds: Rect::default(),
            visible: true,
            hovered: false,
            focused: false,
            enabled: true,
            callback: None,
            screen_reader_text: None,
            screen_reader_description: None,
            screen_reader_ignore: false,
            tooltip: None,
            anchor: None,
            scrolls: false,
            clipped: false,
        }
    }
}

impl fmt::Debug for ElementBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBase")
            .field("local_position", &self.local_position)
            .field("bounds", &self.bounds)
            .field("visible", &self.visible)
            .field("hovered", &self.hovered)
            .field("focused", &self.focused)
            .field("enabled", &self.enabled)
            .field("has_callback", &self.callback.is_some())
            .field("screen_reader_text", &self.screen_reader_text)
            .field("anchor", &self.anchor)
            .field("scrolls", &self.scrolls)
            .finish()
    }
}

impl ElementBase {
    pub fn at(x: u16, y: u16) -> Self {
        Self {
            local_position: Position::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Focus state used for rendering
    pub fn focus_state(&self) -> FocusState {
        if !self.enabled {
            FocusState::Disabled
        } else if self.focused {
            FocusState::Focused
        } else if self.hovered {
            FocusState::Hovered
        } else {
            FocusState::Normal
        }
    }

    /// Visible and not scrolled out of view
    pub fn is_shown(&self) -> bool {
        self.visible && !self.clipped
    }

    /// Shown and enabled
    pub fn is_interactive(&self) -> bool {
        self.is_shown() && self.enabled
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.is_shown() && rect_contains(self.bounds, pos)
    }
}

pub(crate) fn rect_contains(rect: Rect, pos: Position) -> bool {
    pos.x >= rect.x
        && pos.x < rect.x.saturating_add(rect.width)
        && pos.y >= rect.y
        && pos.y < rect.y.saturating_add(rect.height)
}

/// The kinds of control the menu knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Button,
    Checkbox,
    Dropdown,
    Slider,
    TextBox,
    Label,
    KeybindEditor,
}

/// Something a screen-reader or the menu may want to know about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The pointer started hovering the element
    Hovered,
    /// The element was activated or its value changed
    Changed,
}

/// Request to change which element owns exclusive input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    #[default]
    Keep,
    Acquire,
    Release,
}

/// Result of offering an input event to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    /// The event must not be offered to anything else
    pub consumed: bool,
    /// The element's callback should fire
    pub activated: bool,
    pub capture: Capture,
}

impl InputOutcome {
    pub const IGNORED: InputOutcome = InputOutcome {
        consumed: false,
        activated: false,
        capture: Capture::Keep,
    };

    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::IGNORED
        }
    }

    pub fn activated() -> Self {
        Self {
            consumed: true,
            activated: true,
            capture: Capture::Keep,
        }
    }

    pub fn with_capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }
}

/// A control in the widget tree
#[derive(Debug, Clone)]
pub enum Element {
    Button(ButtonState),
    Checkbox(CheckboxState),
    Dropdown(DropdownState),
    Slider(SliderState),
    TextBox(TextBoxState),
    Label(LabelState),
    KeybindEditor(KeybindEditorState),
}

impl Element {
    pub fn base(&self) -> &ElementBase {
        match self {
            Element::Button(s) => &s.base,
            Element::Checkbox(s) => &s.base,
            Element::Dropdown(s) => &s.base,
            Element::Slider(s) => &s.base,
            Element::TextBox(s) => &s.base,
            Element::Label(s) => &s.base,
            Element::KeybindEditor(s) => &s.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ElementBase {
        match self {
            Element::Button(s) => &mut s.base,
            Element::Checkbox(s) => &mut s.base,
            Element::Dropdown(s) => &mut s.base,
            Element::Slider(s) => &mut s.base,
            Element::TextBox(s) => &mut s.base,
            Element::Label(s) => &mut s.base,
            Element::KeybindEditor(s) => &mut s.base,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Element::Button(_) => WidgetKind::Button,
            Element::Checkbox(_) => WidgetKind::Checkbox,
            Element::Dropdown(_) => WidgetKind::Dropdown,
            Element::Slider(_) => WidgetKind::Slider,
            Element::TextBox(_) => WidgetKind::TextBox,
            Element::Label(_) => WidgetKind::Label,
            Element::KeybindEditor(_) => WidgetKind::KeybindEditor,
        }
    }

    /// Natural size (width, height) in cells
    pub fn size(&self) -> (u16, u16) {
        match self {
            Element::Button(s) => s.size(),
            Element::Checkbox(s) => s.size(),
            Element::Dropdown(s) => s.size(),
            Element::Slider(s) => s.size(),
            Element::TextBox(s) => s.size(),
            Element::Label(s) => s.size(),
            Element::KeybindEditor(s) => s.size(),
        }
    }

    /// Whether keyboard focus can land here
    pub fn is_focusable(&self) -> bool {
        match self {
            Element::Label(s) => s.base.callback.is_some(),
            Element::KeybindEditor(_) => false,
            _ => true,
        }
    }

    /// Whether this element wants every event while it is the exclusive target
    pub fn is_capturing(&self) -> bool {
        match self {
            Element::Dropdown(s) => s.is_open(),
            Element::TextBox(s) => s.editing,
            Element::KeybindEditor(s) => s.is_capturing(),
            _ => false,
        }
    }

    /// Whether the pointer is over this element, including popups it owns
    pub fn contains_pointer(&self, pos: Position) -> bool {
        match self {
            Element::Dropdown(s) => s.base.contains(pos) || s.choice_at(pos).is_some(),
            Element::KeybindEditor(s) => s.base.is_shown(),
            other => other.base().contains(pos),
        }
    }

    /// Per-frame update. `hovered` is decided by the container (topmost element only).
    pub fn update(&mut self, input: &FrameInput, hovered: bool) -> Option<Notice> {
        let was_hovered = self.base().hovered;
        self.base_mut().hovered = hovered;

        let changed = match self {
            Element::Slider(s) => s.drag(input),
            Element::Dropdown(s) => {
                s.track_hover(input.cursor);
                false
            }
            _ => false,
        };

        if changed {
            self.fire();
            Some(Notice::Changed)
        } else if hovered && !was_hovered {
            Some(Notice::Hovered)
        } else {
            None
        }
    }

    /// Offer a discrete input event to this element
    pub fn handle_input(&mut self, event: &Event) -> InputOutcome {
        let base = self.base();
        let capturing = self.is_capturing();
        if !capturing && !base.is_interactive() {
            return InputOutcome::IGNORED;
        }

        let outcome = match self {
            Element::Button(s) => s.handle_event(event),
            Element::Checkbox(s) => s.handle_event(event),
            Element::Dropdown(s) => s.handle_event(event),
            Element::Slider(s) => s.handle_event(event),
            Element::TextBox(s) => s.handle_event(event),
            Element::Label(s) => s.handle_event(event),
            Element::KeybindEditor(s) => s.handle_event(event),
        };

        if outcome.activated {
            self.fire();
        }
        outcome
    }

    /// Give up exclusive input: commit text, close popups, stop drags.
    /// Returns true when this changed the element's value.
    pub fn release(&mut self) -> bool {
        let changed = match self {
            Element::TextBox(s) => s.commit(),
            Element::Dropdown(s) => {
                s.cancel();
                false
            }
            Element::Slider(s) => {
                s.dragging = false;
                false
            }
            _ => false,
        };
        if changed {
            self.fire();
        }
        changed
    }

    pub fn draw(&self, frame: &mut Frame, theme: &MenuTheme) {
        if !self.base().is_shown() {
            return;
        }
        match self {
            Element::Button(s) => s.render(frame, theme),
            Element::Checkbox(s) => s.render(frame, theme),
            Element::Dropdown(s) => s.render(frame, theme),
            Element::Slider(s) => s.render(frame, theme),
            Element::TextBox(s) => s.render(frame, theme),
            Element::Label(s) => s.render(frame, theme),
            Element::KeybindEditor(s) => s.render(frame, theme),
        }
    }

    /// Second drawing pass for popups that must sit above every other element
    pub fn draw_overlay(&self, frame: &mut Frame, theme: &MenuTheme) {
        if let Element::Dropdown(s) = self {
            if s.base.is_shown() {
                s.render_popup(frame, theme);
            }
        }
    }

    fn fire(&self) {
        if let Some(callback) = self.base().callback.clone() {
            callback(self);
        }
    }
}
