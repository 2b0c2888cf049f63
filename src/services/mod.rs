//! Services: logging setup, integration error log, settings persistence

pub mod integration_log;
pub mod persistence;
pub mod tracing_setup;
