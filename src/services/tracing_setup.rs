//! Tracing subscriber setup
//!
//! Hosts that do not install their own subscriber can call `init_global` to
//! get file logging filtered by `RUST_LOG` (default `info`).

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// `{state dir}/config-menu/config-menu-{PID}.log`, falling back to the temp dir
pub fn default_log_path() -> PathBuf {
    let dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("config-menu");
    dir.join(format!("config-menu-{}.log", std::process::id()))
}

/// Install the global subscriber writing to `log_file_path`.
///
/// Returns false if the file could not be created or a subscriber was
/// already installed.
pub fn init_global(log_file_path: &Path) -> bool {
    if let Some(parent) = log_file_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let Ok(log_file) = File::create(log_file_path) else {
        return false;
    };
    build_subscriber(log_file).try_init().is_ok()
}

/// Build a subscriber with environment filtering and a file `fmt` layer
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
