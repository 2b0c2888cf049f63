//! Registry of every owner's config, in registration order

use std::fmt;

use super::mod_config::{ModConfig, OwnerId};
use super::page::PageId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    DuplicateRegistration(OwnerId),
    NotRegistered(OwnerId),
    UnknownPage { owner: OwnerId, page: PageId },
    PageCycle { owner: OwnerId, page: PageId },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::DuplicateRegistration(owner) => write!(
                f,
                "{owner} is already registered; unregister first or allow overriding"
            ),
            RegistrationError::NotRegistered(owner) => {
                write!(f, "{owner} has not registered a config menu")
            }
            RegistrationError::UnknownPage { owner, page } => {
                write!(f, "{owner} has no page '{page}'")
            }
            RegistrationError::PageCycle { owner, page } => {
                write!(f, "{owner}: page '{page}' cannot be its own ancestor")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Owner id to config. Iteration order is registration order, which is the
/// order owners appear in the mod list.
#[derive(Debug, Default)]
pub struct ModConfigManager {
    configs: Vec<ModConfig>,
}

impl ModConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a config. An existing registration is kept unless `allow_override`
    /// is set, in which case it is replaced in place.
    pub fn register(&mut self, config: ModConfig, allow_override: bool) -> Result<(), RegistrationError> {
        match self.configs.iter().position(|c| c.id() == config.id()) {
            Some(_) if !allow_override => {
                Err(RegistrationError::DuplicateRegistration(config.id().clone()))
            }
            Some(index) => {
                tracing::info!(owner = %config.id(), "replacing config registration");
                self.configs[index] = config;
                Ok(())
            }
            None => {
                tracing::debug!(owner = %config.id(), "registered config");
                self.configs.push(config);
                Ok(())
            }
        }
    }

    /// Look up an owner. With `assert_exists`, a missing owner is an error
    /// rather than `None`.
    pub fn get(&self, owner: &OwnerId, assert_exists: bool) -> Result<Option<&ModConfig>, RegistrationError> {
        match self.configs.iter().find(|c| c.id() == owner) {
            None if assert_exists => Err(RegistrationError::NotRegistered(owner.clone())),
            found => Ok(found),
        }
    }

    pub fn get_mut(
        &mut self,
        owner: &OwnerId,
        assert_exists: bool,
    ) -> Result<Option<&mut ModConfig>, RegistrationError> {
        match self.configs.iter_mut().find(|c| c.id() == owner) {
            None if assert_exists => Err(RegistrationError::NotRegistered(owner.clone())),
            found => Ok(found),
        }
    }

    /// Shorthand for `get(owner, true)` that unwraps the option
    pub fn require(&self, owner: &OwnerId) -> Result<&ModConfig, RegistrationError> {
        self.get(owner, false)?
            .ok_or_else(|| RegistrationError::NotRegistered(owner.clone()))
    }

    pub fn require_mut(&mut self, owner: &OwnerId) -> Result<&mut ModConfig, RegistrationError> {
        self.get_mut(owner, false)?
            .ok_or_else(|| RegistrationError::NotRegistered(owner.clone()))
    }

    pub fn unregister(&mut self, owner: &OwnerId) -> Option<ModConfig> {
        let index = self.configs.iter().position(|c| c.id() == owner)?;
        Some(self.configs.remove(index))
    }

    pub fn contains(&self, owner: &OwnerId) -> bool {
        self.configs.iter().any(|c| c.id() == owner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModConfig> {
        self.configs.iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionDescriptor, OwnerInfo};

    fn config(id: &str, name: &str) -> ModConfig {
        ModConfig::new(OwnerInfo::new(id, name), || {}, || {}, false)
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut manager = ModConfigManager::new();
        let mut first = config("x", "First");
        first.add_option(None, OptionDescriptor::boolean("a", || true, |_| {}));
        manager.register(first, false).unwrap();

        let second = config("x", "Second");
        assert_eq!(
            manager.register(second, false),
            Err(RegistrationError::DuplicateRegistration("x".into()))
        );
        let kept = manager.require(&"x".into()).unwrap();
        assert_eq!(kept.owner.name, "First");
        assert_eq!(kept.all_options().count(), 1);
    }

    #[test]
    fn test_override_replaces_in_place() {
        let mut manager = ModConfigManager::new();
        manager.register(config("a", "A"), false).unwrap();
        manager.register(config("b", "B"), false).unwrap();
        manager.register(config("a", "A2"), true).unwrap();
        let names: Vec<_> = manager.iter().map(|c| c.owner.name.clone()).collect();
        assert_eq!(names, vec!["A2", "B"]);
    }

    #[test]
    fn test_get_assert_and_unregister() {
        let mut manager = ModConfigManager::new();
        manager.register(config("a", "A"), false).unwrap();
        assert!(manager.unregister(&"a".into()).is_some());
        assert!(manager.get(&"a".into(), false).unwrap().is_none());
        assert_eq!(
            manager.get(&"a".into(), true).unwrap_err(),
            RegistrationError::NotRegistered("a".into())
        );
    }
}
