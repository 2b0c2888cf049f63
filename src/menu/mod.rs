//! Menu controller and navigation
//!
//! - `host`: the host's menu slots, behind a trait
//! - `navigation`: screen values and transitions
//! - `screens`: widget trees built from the registry
//! - `controller`: ties them together each frame

pub mod controller;
pub mod host;
pub mod navigation;
pub mod screens;

pub use controller::MenuController;
pub use host::{HostMenuStack, InMemoryMenuStack, MenuId};
pub use navigation::{DetailState, KeybindTarget, Screen, Transition};
pub use screens::MenuCommand;
