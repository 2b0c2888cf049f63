//! Screen-reader announcements for hovered and changed widgets
//!
//! The bridge turns a widget into one localised sentence and hands it to an
//! optional narration sink. Suppressing repeats of the same sentence is the
//! sink's job; `describe` only guarantees that the same widget state always
//! yields the same text.

use rust_i18n::t;

use crate::view::controls::{Element, Numeric};

/// Text-to-speech provider supplied by the host
pub trait AccessibilitySink {
    /// Speak `text`, optionally interrupting current speech. Returns false if
    /// nothing was spoken.
    fn say(&mut self, text: &str, interrupt: bool) -> bool;

    /// Like `say`, but the sink may skip text identical to the last thing it
    /// spoke for the same `dedup_key` (or the active menu when `None`).
    fn say_with_checker(&mut self, text: &str, interrupt: bool, dedup_key: Option<&str>) -> bool;
}

/// Builds the announcement for an element
pub fn describe(element: &Element) -> String {
    let base = element.base();
    let label = match element {
        Element::Button(s) => base.screen_reader_text.clone().unwrap_or_else(|| s.label.clone()),
        Element::Label(s) if s.input_listener.is_none() => {
            base.screen_reader_text.clone().unwrap_or_else(|| s.text.clone())
        }
        _ => base.screen_reader_text.clone().unwrap_or_default(),
    };
    if label.trim().is_empty() {
        return t!("options_element.unknown").to_string();
    }

    let text = match element {
        Element::Button(_) => t!("options_element.button_info", label = label).to_string(),
        Element::Checkbox(s) => t!(
            "options_element.checkbox_info",
            label = label,
            is_checked = if s.checked { 1 } else { 0 }
        )
        .to_string(),
        Element::Dropdown(s) => t!(
            "options_element.dropdown_info",
            label = label,
            selected_option = s.label().unwrap_or_default()
        )
        .to_string(),
        Element::Slider(s) => {
            let value = match s.numeric {
                Numeric::Int => (s.value.round() as i64).to_string(),
                Numeric::Float => s.value.to_string(),
            };
            t!("options_element.slider_info", label = label, slider_value = value).to_string()
        }
        Element::TextBox(s) => {
            let value = if s.value.is_empty() { "null" } else { s.value.as_str() };
            t!("options_element.text_box_info", label = label, value = value).to_string()
        }
        Element::Label(s) => match &s.input_listener {
            Some(_) => t!(
                "options_element.input_listener_info",
                label = label,
                buttons_list = s.text
            )
            .to_string(),
            None => label,
        },
        Element::KeybindEditor(_) => label,
    };

    match base.screen_reader_description.as_deref() {
        Some(description) if !description.is_empty() => format!("{text}\n{description}"),
        _ => text,
    }
}

/// Forwards widget notices to the host's narration sink, if there is one
#[derive(Default)]
pub struct ScreenReaderBridge {
    sink: Option<Box<dyn AccessibilitySink>>,
}

impl ScreenReaderBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: Box<dyn AccessibilitySink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn set_sink(&mut self, sink: Option<Box<dyn AccessibilitySink>>) {
        self.sink = sink;
    }

    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    /// Announce a widget the pointer just moved onto
    pub fn on_hovered(&mut self, element: &Element) -> bool {
        self.announce(element)
    }

    /// Announce a widget whose value just changed
    pub fn on_changed(&mut self, element: &Element) -> bool {
        self.announce(element)
    }

    /// Speak arbitrary text (screen titles and the like)
    pub fn say(&mut self, text: &str) -> bool {
        match self.sink.as_mut() {
            Some(sink) => sink.say(text, true),
            None => false,
        }
    }

    fn announce(&mut self, element: &Element) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        if element.base().screen_reader_ignore {
            return false;
        }
        let text = describe(element);
        tracing::trace!(%text, "screen reader announcement");
        sink.say_with_checker(&text, true, None)
    }
}
