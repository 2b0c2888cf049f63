//! Persistence collaborator for the menu's own settings
//!
//! Stores hold one JSON document. Owners persist their own configs through
//! their save callbacks; nothing here touches owner storage.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub trait ConfigStore {
    /// The stored document, or `None` if nothing was written yet
    fn read_value(&self) -> anyhow::Result<Option<Value>>;

    fn write_value(&self, value: &Value) -> anyhow::Result<()>;
}

/// Read a typed config, falling back to its default when nothing is stored
pub fn read_config<T: DeserializeOwned + Default>(store: &dyn ConfigStore) -> anyhow::Result<T> {
    match store.read_value()? {
        Some(value) => serde_json::from_value(value).context("stored config has the wrong shape"),
        None => Ok(T::default()),
    }
}

pub fn write_config<T: Serialize>(store: &dyn ConfigStore, config: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(config).context("failed to serialize config")?;
    store.write_value(&value)
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{config dir}/config-menu/config.json`
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("config-menu").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn read_value(&self) -> anyhow::Result<Option<Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        let value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(value))
    }

    fn write_value(&self, value: &Value) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(value)?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "wrote config");
        Ok(())
    }
}

/// In-memory store for tests and hosts without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: RefCell<Option<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn read_value(&self) -> anyhow::Result<Option<Value>> {
        Ok(self.value.borrow().clone())
    }

    fn write_value(&self, value: &Value) -> anyhow::Result<()> {
        *self.value.borrow_mut() = Some(value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        speed: u32,
        name: String,
    }

    #[test]
    fn test_missing_file_reads_default() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        let sample: Sample = read_config(&store).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_file_round_trip_creates_parent() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("config.json"));
        let sample = Sample {
            speed: 7,
            name: "menu".into(),
        };
        write_config(&store, &sample).unwrap();
        assert_eq!(read_config::<Sample>(&store).unwrap(), sample);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_config::<Sample>(&JsonFileStore::new(path)).is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.read_value().unwrap().is_none());
        write_config(&store, &Sample::default()).unwrap();
        assert!(store.read_value().unwrap().is_some());
    }
}
