//! Registration API used by owners
//!
//! Every call is forgiving: mistakes in an owner's integration code (calls
//! before `register`, bad bounds, duplicate registrations) are written to the
//! integration log once per owner and otherwise ignored, so a broken owner
//! can never take the host down.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::input::KeybindList;
use crate::model::{
    LazyText, ModConfig, ModConfigManager, OptionDescriptor, OptionError, OptionValue, OwnerId,
    OwnerInfo, PageId, RegistrationError,
};
use crate::services::integration_log::IntegrationLog;

/// Something an owner asked the menu to show, handled on the next frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuRequest {
    OpenList,
    OpenMod(OwnerId),
}

pub type RequestQueue = Rc<RefCell<VecDeque<MenuRequest>>>;

/// Cloneable handle to the registry, given to every owner
#[derive(Clone)]
pub struct Api {
    manager: Rc<RefCell<ModConfigManager>>,
    log: Rc<IntegrationLog>,
    requests: RequestQueue,
}

impl Api {
    pub fn new(
        manager: Rc<RefCell<ModConfigManager>>,
        log: Rc<IntegrationLog>,
        requests: RequestQueue,
    ) -> Self {
        Self {
            manager,
            log,
            requests,
        }
    }

    /// Register an owner's menu. Fails if it is already registered.
    pub fn register(
        &self,
        owner: OwnerInfo,
        reset: impl Fn() + 'static,
        save: impl Fn() + 'static,
        title_screen_only: bool,
    ) -> Result<(), RegistrationError> {
        self.register_inner(owner, reset, save, title_screen_only, false)
    }

    /// Register an owner's menu, replacing any existing registration
    pub fn register_with_override(
        &self,
        owner: OwnerInfo,
        reset: impl Fn() + 'static,
        save: impl Fn() + 'static,
        title_screen_only: bool,
    ) -> Result<(), RegistrationError> {
        self.register_inner(owner, reset, save, title_screen_only, true)
    }

    #[deprecated(note = "use `register`, which takes the title-screen-only flag")]
    pub fn register_simple(
        &self,
        owner: OwnerInfo,
        reset: impl Fn() + 'static,
        save: impl Fn() + 'static,
    ) -> Result<(), RegistrationError> {
        self.log.deprecated(&owner.id, "register_simple");
        self.register_inner(owner, reset, save, false, false)
    }

    fn register_inner(
        &self,
        owner: OwnerInfo,
        reset: impl Fn() + 'static,
        save: impl Fn() + 'static,
        title_screen_only: bool,
        allow_override: bool,
    ) -> Result<(), RegistrationError> {
        let id = owner.id.clone();
        let config = ModConfig::new(owner, reset, save, title_screen_only);
        let result = self.manager.borrow_mut().register(config, allow_override);
        if let Err(e) = &result {
            self.log.report(&id, e);
        }
        result
    }

    /// Remove an owner's menu. Returns false if it was not registered.
    pub fn unregister(&self, owner: &OwnerId) -> bool {
        let removed = self.manager.borrow_mut().unregister(owner).is_some();
        if !removed {
            self.log.report(owner, &RegistrationError::NotRegistered(owner.clone()));
        }
        removed
    }

    pub fn is_registered(&self, owner: &OwnerId) -> bool {
        self.manager.borrow().contains(owner)
    }

    fn with_config<R>(&self, owner: &OwnerId, f: impl FnOnce(&mut ModConfig) -> R) -> Option<R> {
        let mut manager = self.manager.borrow_mut();
        match manager.require_mut(owner) {
            Ok(config) => Some(f(config)),
            Err(e) => {
                self.log.report(owner, &e);
                None
            }
        }
    }

    /// Add an option to `page`, or to the page most recently added when `None`
    pub fn add_option(
        &self,
        owner: &OwnerId,
        page: Option<PageId>,
        descriptor: OptionDescriptor,
    ) -> Option<Rc<OptionDescriptor>> {
        self.with_config(owner, |config| config.add_option(page, descriptor))
    }

    fn add_checked(
        &self,
        owner: &OwnerId,
        page: Option<PageId>,
        descriptor: Result<OptionDescriptor, OptionError>,
    ) -> Option<Rc<OptionDescriptor>> {
        match descriptor {
            Ok(descriptor) => self.add_option(owner, page, descriptor),
            Err(e) => {
                self.log.report(owner, &e);
                None
            }
        }
    }

    pub fn add_bool_option(
        &self,
        owner: &OwnerId,
        name: impl Into<LazyText>,
        get: impl Fn() -> bool + 'static,
        set: impl Fn(bool) + 'static,
    ) -> Option<Rc<OptionDescriptor>> {
        self.add_option(owner, None, OptionDescriptor::boolean(name, get, set))
    }

    /// Integer option; with both bounds it is edited with a slider
    pub fn add_int_option(
        &self,
        owner: &OwnerId,
        name: impl Into<LazyText>,
        get: impl Fn() -> i64 + 'static,
        set: impl Fn(i64) + 'static,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Option<Rc<OptionDescriptor>> {
        self.add_checked(owner, None, OptionDescriptor::integer(name, get, set, min, max))
    }

    pub fn add_float_option(
        &self,
        owner: &OwnerId,
        name: impl Into<LazyText>,
        get: impl Fn() -> f64 + 'static,
        set: impl Fn(f64) + 'static,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Option<Rc<OptionDescriptor>> {
        self.add_checked(owner, None, OptionDescriptor::float(name, get, set, min, max))
    }

    pub fn add_text_option(
        &self,
        owner: &OwnerId,
        name: impl Into<LazyText>,
        get: impl Fn() -> String + 'static,
        set: impl Fn(String) + 'static,
    ) -> Option<Rc<OptionDescriptor>> {
        self.add_option(owner, None, OptionDescriptor::text(name, get, set))
    }

    pub fn add_choice_option(
        &self,
        owner: &OwnerId,
        name: impl Into<LazyText>,
        get: impl Fn() -> String + 'static,
        set: impl Fn(String) + 'static,
        allowed: Vec<String>,
    ) -> Option<Rc<OptionDescriptor>> {
        self.add_option(owner, None, OptionDescriptor::choice(name, get, set, allowed))
    }

    pub fn add_keybind_option(
        &self,
        owner: &OwnerId,
        name: impl Into<LazyText>,
        get: impl Fn() -> KeybindList + 'static,
        set: impl Fn(KeybindList) + 'static,
    ) -> Option<Rc<OptionDescriptor>> {
        self.add_option(owner, None, OptionDescriptor::keybinds(name, get, set))
    }

    pub fn add_section_title(
        &self,
        owner: &OwnerId,
        text: impl Into<LazyText>,
        tooltip: Option<LazyText>,
    ) {
        self.with_config(owner, |config| config.add_section_title(None, text, tooltip));
    }

    pub fn add_paragraph(&self, owner: &OwnerId, text: impl Into<LazyText>) {
        self.with_config(owner, |config| config.add_paragraph(None, text));
    }

    /// Start a page under the root page; later entries without a page land on it
    pub fn add_page(&self, owner: &OwnerId, page: PageId, display_name: impl Into<LazyText>) {
        self.with_config(owner, |config| config.add_page(page, display_name));
    }

    /// Start a page under `parent`
    pub fn add_subpage(
        &self,
        owner: &OwnerId,
        parent: PageId,
        page: PageId,
        display_name: impl Into<LazyText>,
    ) -> bool {
        let result = self.with_config(owner, |config| config.add_subpage(parent, page, display_name));
        match result {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                self.log.report(owner, &e);
                false
            }
            None => false,
        }
    }

    pub fn add_page_link(
        &self,
        owner: &OwnerId,
        target: PageId,
        text: impl Into<LazyText>,
        tooltip: Option<LazyText>,
    ) {
        self.with_config(owner, |config| config.add_page_link(None, target, text, tooltip));
    }

    pub fn set_title_screen_only_for_next_options(&self, owner: &OwnerId, only: bool) {
        self.with_config(owner, |config| config.set_title_screen_only_for_next_options(only));
    }

    /// Called with the field id and pending value whenever the user edits an
    /// option that has a field id
    pub fn on_field_changed(&self, owner: &OwnerId, hook: impl Fn(&str, &OptionValue) + 'static) {
        self.with_config(owner, |config| config.on_field_changed(hook));
    }

    /// Open an owner's menu on the next frame, bypassing the mod list
    pub fn open_menu(&self, owner: &OwnerId) {
        if self.with_config(owner, |_| ()).is_some() {
            self.requests
                .borrow_mut()
                .push_back(MenuRequest::OpenMod(owner.clone()));
        }
    }

    pub fn open_list_menu(&self) {
        self.requests.borrow_mut().push_back(MenuRequest::OpenList);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn api() -> (Api, Rc<RefCell<ModConfigManager>>, Rc<IntegrationLog>, RequestQueue) {
        let manager = Rc::new(RefCell::new(ModConfigManager::new()));
        let log = Rc::new(IntegrationLog::new());
        let requests = RequestQueue::default();
        (
            Api::new(manager.clone(), log.clone(), requests.clone()),
            manager,
            log,
            requests,
        )
    }

    fn owner() -> OwnerInfo {
        OwnerInfo::new("a.mod", "A Mod")
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let (api, manager, log, _) = api();
        api.register(owner(), || {}, || {}, false).unwrap();
        api.add_bool_option(&owner().id, "Sound", || true, |_| {});

        let second = api.register(owner(), || {}, || {}, true);
        assert_eq!(
            second,
            Err(RegistrationError::DuplicateRegistration(owner().id))
        );
        let manager = manager.borrow();
        let config = manager.require(&owner().id).unwrap();
        assert!(!config.is_title_screen_only());
        assert_eq!(config.all_options().count(), 1);
        assert!(log.was_reported(
            &owner().id,
            &RegistrationError::DuplicateRegistration(owner().id).to_string()
        ));
    }

    #[test]
    fn test_override_replaces_registration() {
        let (api, manager, _, _) = api();
        api.register(owner(), || {}, || {}, false).unwrap();
        api.add_bool_option(&owner().id, "Sound", || true, |_| {});
        api.register_with_override(owner(), || {}, || {}, true).unwrap();
        let manager = manager.borrow();
        let config = manager.require(&owner().id).unwrap();
        assert!(config.is_title_screen_only());
        assert_eq!(config.all_options().count(), 0);
    }

    #[test]
    fn test_override_registers_a_new_owner() {
        let (api, _, log, _) = api();
        assert!(api.register_with_override(owner(), || {}, || {}, false).is_ok());
        assert!(api.is_registered(&owner().id));
        assert!(!log.was_reported(
            &owner().id,
            &RegistrationError::DuplicateRegistration(owner().id).to_string()
        ));
    }

    #[test]
    fn test_calls_before_register_are_logged_once() {
        let (api, _, log, _) = api();
        let id = owner().id;
        assert!(api.add_bool_option(&id, "Sound", || true, |_| {}).is_none());
        api.add_paragraph(&id, "text");
        let message = RegistrationError::NotRegistered(id.clone()).to_string();
        assert!(log.was_reported(&id, &message));
        assert!(!log.report(&id, &message));
    }

    #[test]
    fn test_invalid_bounds_are_rejected() {
        let (api, manager, log, _) = api();
        api.register(owner(), || {}, || {}, false).unwrap();
        let added = api.add_int_option(&owner().id, "Speed", || 1, |_| {}, Some(10), Some(1));
        assert!(added.is_none());
        assert_eq!(manager.borrow().require(&owner().id).unwrap().all_options().count(), 0);
        assert!(log.was_reported(
            &owner().id,
            "Invalid bounds: min 10 is greater than max 1"
        ));
    }

    #[test]
    fn test_page_entries_follow_add_page() {
        let (api, manager, _, _) = api();
        let id = owner().id;
        api.register(owner(), || {}, || {}, false).unwrap();
        api.add_bool_option(&id, "Root option", || true, |_| {});
        api.add_page(&id, PageId::new("audio"), "Audio");
        api.add_bool_option(&id, "Music", || true, |_| {});
        assert!(api.add_subpage(&id, PageId::new("audio"), PageId::new("mixer"), "Mixer"));
        assert!(!api.add_subpage(&id, PageId::new("mixer"), PageId::new("audio"), "Loop"));

        let manager = manager.borrow();
        let config = manager.require(&id).unwrap();
        assert_eq!(config.root().options().count(), 1);
        assert_eq!(config.page(&PageId::new("audio")).unwrap().options().count(), 1);
        assert_eq!(config.pages().len(), 3);
    }

    #[test]
    fn test_open_menu_queues_request_for_registered_owner() {
        let (api, _, _, requests) = api();
        api.open_menu(&owner().id);
        assert!(requests.borrow().is_empty());
        api.register(owner(), || {}, || {}, false).unwrap();
        api.open_menu(&owner().id);
        assert_eq!(
            requests.borrow_mut().pop_front(),
            Some(MenuRequest::OpenMod(owner().id))
        );
    }

    #[test]
    fn test_unregister() {
        let (api, _, _, _) = api();
        api.register(owner(), || {}, || {}, false).unwrap();
        assert!(api.unregister(&owner().id));
        assert!(!api.is_registered(&owner().id));
        assert!(!api.unregister(&owner().id));
    }

    #[test]
    #[allow(deprecated)]
    fn test_deprecated_registration_still_works() {
        let (api, _, log, _) = api();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        api.register_simple(owner(), || {}, move || flag.set(true)).unwrap();
        assert!(api.is_registered(&owner().id));
        assert!(!log.deprecated(&owner().id, "register_simple"));
        assert!(!called.get());
    }
}
