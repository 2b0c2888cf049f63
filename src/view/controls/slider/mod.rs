//! Slider control for bounded numeric values
//!
//! Renders as: `[────●───────] 42`
//!
//! Unlike the other controls the slider keeps firing while it is dragged:
//! a press inside the track starts a drag, and every frame the primary button
//! stays held the value follows the cursor.

mod input;
mod render;

use std::fmt;
use std::rc::Rc;

use ratatui::layout::Position;
use unicode_width::UnicodeWidthStr;

use super::ElementBase;
use crate::input::FrameInput;

/// Cells between the brackets
pub const TRACK_WIDTH: u16 = 16;

/// Whether the slider edits an integer or a float
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    Int,
    Float,
}

/// Turns a slider value into display text
pub type ValueFormatter = Rc<dyn Fn(f64) -> String>;

/// State for a slider control
#[derive(Clone)]
pub struct SliderState {
    pub base: ElementBase,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    /// Snap step; integers always snap to whole numbers
    pub interval: Option<f64>,
    pub numeric: Numeric,
    pub formatter: Option<ValueFormatter>,
    /// Set while the primary button is held after a press on the track
    pub dragging: bool,
}

impl fmt::Debug for SliderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliderState")
            .field("base", &self.base)
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("interval", &self.interval)
            .field("numeric", &self.numeric)
            .field("dragging", &self.dragging)
            .finish()
    }
}

impl SliderState {
    pub fn new(value: f64, min: f64, max: f64, numeric: Numeric) -> Self {
        let mut state = Self {
            base: ElementBase::default(),
            value,
            min,
            max,
            interval: None,
            numeric,
            formatter: None,
            dragging: false,
        };
        // Shown as given until the user moves the slider
        state.value = value.clamp(min, max);
        state
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = base;
        self
    }

    pub fn with_interval(mut self, interval: Option<f64>) -> Self {
        self.interval = interval.filter(|step| *step > 0.0);
        self
    }

    pub fn with_formatter(mut self, formatter: Option<ValueFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Clamp into range and round to the step
    pub fn snap(&self, value: f64) -> f64 {
        let mut v = value.clamp(self.min, self.max);
        if let Some(step) = self.interval {
            v = self.min + ((v - self.min) / step).round() * step;
        }
        if self.numeric == Numeric::Int {
            v = v.round();
        }
        // Steps like 0.1 accumulate binary noise
        v = (v * 1e6).round() / 1e6;
        v.clamp(self.min, self.max)
    }

    /// Set the value, returning true if it changed
    pub fn set_value(&mut self, value: f64) -> bool {
        let snapped = self.snap(value);
        let changed = snapped != self.value;
        self.value = snapped;
        changed
    }

    /// Amount moved by one arrow key press
    pub fn key_step(&self) -> f64 {
        match (self.interval, self.numeric) {
            (Some(step), _) => step,
            (None, Numeric::Int) => 1.0,
            (None, Numeric::Float) => ((self.max - self.min) / 100.0).max(f64::EPSILON),
        }
    }

    pub fn display_value(&self) -> String {
        self.format(self.value)
    }

    fn format(&self, value: f64) -> String {
        match (&self.formatter, self.numeric) {
            (Some(formatter), _) => formatter(value),
            (None, Numeric::Int) => format!("{}", value.round() as i64),
            (None, Numeric::Float) => format!("{value}"),
        }
    }

    fn value_width(&self) -> u16 {
        [self.min, self.max, self.value]
            .iter()
            .map(|v| self.format(*v).width())
            .max()
            .unwrap_or(0) as u16
    }

    pub fn size(&self) -> (u16, u16) {
        (TRACK_WIDTH + 3 + self.value_width(), 1)
    }

    /// Handle column for the current value, relative to the first track cell
    pub fn handle_offset(&self) -> u16 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0;
        }
        let frac = (self.value - self.min) / span;
        (frac * f64::from(TRACK_WIDTH - 1)).round() as u16
    }

    /// Value under a screen column
    pub fn value_at_column(&self, column: u16) -> f64 {
        let track_x = self.base.bounds.x.saturating_add(1);
        let offset = column.saturating_sub(track_x).min(TRACK_WIDTH - 1);
        let frac = f64::from(offset) / f64::from(TRACK_WIDTH - 1);
        self.min + frac * (self.max - self.min)
    }

    pub(crate) fn drag(&mut self, input: &FrameInput) -> bool {
        if !self.dragging {
            return false;
        }
        if !input.primary_held {
            self.dragging = false;
            return false;
        }
        match input.cursor {
            Some(Position { x, .. }) => self.set_value(self.value_at_column(x)),
            None => false,
        }
    }
}
