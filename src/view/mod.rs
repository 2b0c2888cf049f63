//! View and UI layer
//!
//! Widgets, the widget tree and the screen-reader bridge.

pub mod controls;
pub mod screen_reader;
pub mod theme;
pub mod ui;
