// Configuration menu library - exposes all core modules for hosts and tests

rust_i18n::i18n!("locales", fallback = "en");

pub mod api;
pub mod app;
pub mod config;
pub mod input;
pub mod menu;
pub mod model;
pub mod services;
pub mod view;

pub use api::Api;
pub use app::ConfigMenuApp;
pub use model::{ModConfig, ModConfigManager, OptionDescriptor, OptionValue, OwnerId, OwnerInfo, PageId};
