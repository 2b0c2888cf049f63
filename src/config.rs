use crate::input::KeybindList;
use crate::services::persistence::{read_config, write_config, ConfigStore};
use serde::{Deserialize, Serialize};

pub const MIN_SCROLL_SPEED: u32 = 1;
pub const MAX_SCROLL_SPEED: u32 = 500;

/// Wheel units that make up one scrolled row
const SCROLL_UNITS_PER_ROW: u32 = 40;

/// The menu's own settings, shown as its own entry in the mod list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    /// How far one wheel notch scrolls a menu
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: u32,

    /// Opens the mod list from anywhere in a session
    #[serde(default)]
    pub open_menu_key: KeybindList,
}

fn default_scroll_speed() -> u32 {
    120
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            scroll_speed: default_scroll_speed(),
            open_menu_key: KeybindList::default(),
        }
    }
}

impl MenuConfig {
    /// Rows scrolled per wheel notch (at least one)
    pub fn rows_per_notch(&self) -> usize {
        self.scroll_speed
            .clamp(MIN_SCROLL_SPEED, MAX_SCROLL_SPEED)
            .div_ceil(SCROLL_UNITS_PER_ROW) as usize
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SCROLL_SPEED..=MAX_SCROLL_SPEED).contains(&self.scroll_speed) {
            return Err(ConfigError::ValidationError(format!(
                "scroll_speed must be between {MIN_SCROLL_SPEED} and {MAX_SCROLL_SPEED}"
            )));
        }
        Ok(())
    }

    /// Load from `store`. Missing, unreadable or invalid settings give the defaults.
    pub fn load(store: &dyn ConfigStore) -> Self {
        let config = match read_config::<MenuConfig>(store) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load menu config, using defaults: {e:#}");
                return Self::default();
            }
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn ConfigStore) -> Result<(), ConfigError> {
        self.validate()?;
        write_config(store, self).map_err(|e| ConfigError::IoError(format!("{e:#}")))
    }
}

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    IoError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Keybind;
    use crate::services::persistence::{JsonFileStore, MemoryStore};
    use crossterm::event::KeyCode;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MenuConfig::default();
        assert_eq!(config.scroll_speed, 120);
        assert!(!config.open_menu_key.is_bound());
        assert!(config.validate().is_ok());
        assert_eq!(config.rows_per_notch(), 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: MenuConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MenuConfig::default());
    }

    #[test]
    fn test_validation_rejects_out_of_range_speed() {
        let config = MenuConfig {
            scroll_speed: 0,
            ..MenuConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
        assert!(config.save(&MemoryStore::new()).is_err());
    }

    #[test]
    fn test_rows_per_notch_is_at_least_one() {
        let slow = MenuConfig {
            scroll_speed: 1,
            ..MenuConfig::default()
        };
        assert_eq!(slow.rows_per_notch(), 1);
    }

    #[test]
    fn test_round_trip_through_json_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("config.json"));
        let config = MenuConfig {
            scroll_speed: 200,
            open_menu_key: KeybindList::single(Keybind::key(KeyCode::F(9))),
        };
        config.save(&store).unwrap();
        assert_eq!(MenuConfig::load(&store), config);
    }

    #[test]
    fn test_invalid_stored_config_falls_back_to_default() {
        let store = MemoryStore::new();
        store
            .write_value(&serde_json::json!({ "scroll_speed": 9000 }))
            .unwrap();
        assert_eq!(MenuConfig::load(&store), MenuConfig::default());
    }
}
