//! Registration model: option descriptors, pages, per-owner configs and the
//! registry that holds them

pub mod manager;
pub mod mod_config;
pub mod option;
pub mod page;

pub use manager::{ModConfigManager, RegistrationError};
pub use mod_config::{FieldChanged, ModConfig, OwnerCallback, OwnerHooks, OwnerId, OwnerInfo};
pub use option::{
    Bounds, CustomWidget, Formatter, Getter, LazyText, NumericBounds, OptionDescriptor,
    OptionError, OptionKind, OptionValue, Setter,
};
pub use page::{ConfigPage, PageEntry, PageId};
