// Integration tests - testing how the registry, API and persistence work together

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use config_menu::api::{Api, MenuRequest, RequestQueue};
use config_menu::config::MenuConfig;
use config_menu::input::{Keybind, KeybindList};
use config_menu::menu::{InMemoryMenuStack, MenuCommand, MenuController};
use config_menu::model::{OptionError, RegistrationError};
use config_menu::services::integration_log::IntegrationLog;
use config_menu::services::persistence::{ConfigStore, JsonFileStore};
use config_menu::{ModConfigManager, OptionValue, OwnerId, OwnerInfo, PageId};
use config_menu::OptionDescriptor;
use crossterm::event::KeyCode;
use ratatui::layout::Rect;
use tempfile::TempDir;

struct Fixture {
    api: Api,
    manager: Rc<RefCell<ModConfigManager>>,
    log: Rc<IntegrationLog>,
    requests: RequestQueue,
}

fn fixture() -> Fixture {
    let manager = Rc::new(RefCell::new(ModConfigManager::new()));
    let log = Rc::new(IntegrationLog::new());
    let requests = RequestQueue::default();
    Fixture {
        api: Api::new(manager.clone(), log.clone(), requests.clone()),
        manager,
        log,
        requests,
    }
}

fn owner() -> OwnerInfo {
    OwnerInfo::new("example.mod", "Example Mod")
}

#[test]
fn test_duplicate_registration_keeps_first_and_logs_once() {
    let Fixture { api, manager, log, .. } = fixture();
    let saves = Rc::new(Cell::new(0));
    let counter = saves.clone();
    api.register(owner(), || {}, move || counter.set(counter.get() + 1), false)
        .unwrap();

    let duplicate = RegistrationError::DuplicateRegistration(OwnerId::new("example.mod"));
    for _ in 0..3 {
        let result = api.register(owner(), || {}, || {}, false);
        assert_eq!(result, Err(duplicate.clone()));
    }
    assert!(log.was_reported(&OwnerId::new("example.mod"), &duplicate.to_string()));

    let mut controller = MenuController::new(manager, log);
    let mut host = InMemoryMenuStack::in_session(Rect::new(0, 0, 80, 24));
    controller
        .open_mod_menu(&mut host, &OwnerId::new("example.mod"))
        .unwrap();
    controller.dispatch(&mut host, MenuCommand::Save);
    assert_eq!(saves.get(), 1, "the first registration's callbacks are kept");
}

#[test]
fn test_entries_before_register_are_ignored() {
    let Fixture { api, log, .. } = fixture();
    let id = OwnerId::new("example.mod");
    assert!(api.add_bool_option(&id, "Enabled", || true, |_| {}).is_none());
    assert!(api.add_text_option(&id, "Name", String::new, |_| {}).is_none());
    let message = RegistrationError::NotRegistered(id.clone()).to_string();
    assert!(log.was_reported(&id, &message));
    assert!(!log.report(&id, &message), "reported once per owner");
}

#[test]
fn test_numeric_bounds() {
    let Fixture { api, log, .. } = fixture();
    let id = owner().id;
    api.register(owner(), || {}, || {}, false).unwrap();

    let value = Rc::new(Cell::new(5_i64));
    let (get, set) = (value.clone(), value.clone());
    let option = api
        .add_int_option(&id, "Count", move || get.get(), move |v| set.set(v), Some(0), Some(10))
        .unwrap();

    option.write(OptionValue::Int(7)).unwrap();
    assert_eq!(value.get(), 7);
    assert!(matches!(
        option.write(OptionValue::Int(11)),
        Err(OptionError::OutOfRange { .. })
    ));
    assert_eq!(value.get(), 7);

    assert!(api
        .add_float_option(&id, "Ratio", || 0.5, |_| {}, Some(1.0), Some(0.0))
        .is_none());
    let error = OptionDescriptor::float("Ratio", || 0.5, |_| {}, Some(1.0), Some(0.0)).unwrap_err();
    assert!(matches!(error, OptionError::InvalidBounds { .. }));
    assert!(log.was_reported(&id, &error.to_string()));
}

#[test]
fn test_pages_are_created_once() {
    let Fixture { api, manager, .. } = fixture();
    let id = owner().id;
    api.register(owner(), || {}, || {}, false).unwrap();

    api.add_page(&id, PageId::new("audio"), "Audio");
    api.add_bool_option(&id, "Music", || true, |_| {});
    api.add_page(&id, PageId::new("audio"), "Sound");
    api.add_bool_option(&id, "Effects", || true, |_| {});
    api.add_page_link(&id, PageId::new("video"), "Video", None);

    let manager = manager.borrow();
    let config = manager.require(&id).unwrap();
    let audio: Vec<_> = config
        .pages()
        .iter()
        .filter(|p| p.id == PageId::new("audio"))
        .collect();
    assert_eq!(audio.len(), 1);
    assert_eq!(audio[0].display_name.get(), "Sound");
    assert_eq!(audio[0].entries.len(), 3);
}

#[test]
fn test_open_menu_requests_only_for_registered_owners() {
    let Fixture { api, requests, .. } = fixture();
    api.open_menu(&OwnerId::new("example.mod"));
    assert!(requests.borrow().is_empty());

    api.register(owner(), || {}, || {}, false).unwrap();
    api.open_menu(&OwnerId::new("example.mod"));
    api.open_list_menu();
    assert_eq!(
        requests.borrow_mut().drain(..).collect::<Vec<_>>(),
        vec![
            MenuRequest::OpenMod(OwnerId::new("example.mod")),
            MenuRequest::OpenList
        ]
    );
}

#[test]
fn test_menu_config_json_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("config.json"));
    assert_eq!(MenuConfig::load(&store), MenuConfig::default());

    let config = MenuConfig {
        scroll_speed: 80,
        open_menu_key: KeybindList::single(Keybind::key(KeyCode::F(6))),
    };
    config.save(&store).unwrap();
    assert!(store.path().exists());
    assert_eq!(MenuConfig::load(&store), config);
    assert_eq!(MenuConfig::load(&store).rows_per_notch(), 2);
}

#[test]
fn test_corrupt_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStore::new(path);
    assert!(store.read_value().is_err());
    assert_eq!(MenuConfig::load(&store), MenuConfig::default());
}
