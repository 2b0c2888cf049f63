//! Host glue: wires the registry, the controller and the screen reader into
//! the host's frame hooks
//!
//! The host calls `on_launched` once, then `on_update_ticking`,
//! `on_rendered` and the input hooks every frame. The title-screen button is
//! set up a few frames after launch so other integrations get to register
//! first. While a session runs, a "Mod Options" button sits on the host's
//! options page.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::Frame;
use rust_i18n::t;

use crate::api::{Api, MenuRequest, RequestQueue};
use crate::config::{MenuConfig, MAX_SCROLL_SPEED, MIN_SCROLL_SPEED};
use crate::input::{pressed_chord, FrameInput, InputButton};
use crate::menu::host::{active_config_menu, HostMenuStack, MenuId};
use crate::menu::MenuController;
use crate::model::{LazyText, ModConfigManager, OptionDescriptor, OwnerId, OwnerInfo};
use crate::services::integration_log::IntegrationLog;
use crate::services::persistence::ConfigStore;
use crate::view::controls::{Anchor, ButtonState, Callback, Element, ElementBase, Notice};
use crate::view::screen_reader::{AccessibilitySink, ScreenReaderBridge};
use crate::view::theme::MenuTheme;
use crate::view::ui::RootElement;

/// Owner id under which the menu registers its own settings
pub const OWN_OWNER_ID: &str = "config-menu";

/// Frames to wait after launch before adding the title-screen button
const TITLE_SETUP_DELAY: u32 = 5;

/// Failure of the "open mod config" trigger action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenModConfigError {
    NotEnoughArguments,
    NotLoaded(OwnerId),
    NotRegistered(OwnerId),
}

impl fmt::Display for OpenModConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenModConfigError::NotEnoughArguments => {
                f.write_str(&t!("action.not_enough_arguments"))
            }
            OpenModConfigError::NotLoaded(owner) => {
                let owner = owner.as_str();
                f.write_str(&t!("action.mod_not_loaded", owner = owner))
            }
            OpenModConfigError::NotRegistered(owner) => {
                let owner = owner.as_str();
                f.write_str(&t!("action.mod_not_registered", owner = owner))
            }
        }
    }
}

impl std::error::Error for OpenModConfigError {}

pub struct ConfigMenuApp {
    config: Rc<RefCell<MenuConfig>>,
    store: Rc<dyn ConfigStore>,
    manager: Rc<RefCell<ModConfigManager>>,
    log: Rc<IntegrationLog>,
    requests: RequestQueue,
    controller: MenuController,
    bridge: ScreenReaderBridge,
    theme: MenuTheme,
    /// Holds the "configure mods" button shown on the title screen
    title_ui: Option<RootElement>,
    /// Button added to the host's options page, keyed by that page
    options_ui: Option<(MenuId, RootElement)>,
    /// Frames left before title setup; `None` once it ran
    countdown: Option<u32>,
}

impl ConfigMenuApp {
    pub fn new(store: Rc<dyn ConfigStore>) -> Self {
        let config = MenuConfig::load(store.as_ref());
        let manager = Rc::new(RefCell::new(ModConfigManager::new()));
        let log = Rc::new(IntegrationLog::new());
        let mut controller = MenuController::new(manager.clone(), log.clone());
        controller.set_rows_per_notch(config.rows_per_notch());
        Self {
            config: Rc::new(RefCell::new(config)),
            store,
            manager,
            log,
            requests: RequestQueue::default(),
            controller,
            bridge: ScreenReaderBridge::new(),
            theme: MenuTheme::default(),
            title_ui: None,
            options_ui: None,
            countdown: None,
        }
    }

    /// Handle for owners to register through
    pub fn api(&self) -> Api {
        Api::new(self.manager.clone(), self.log.clone(), self.requests.clone())
    }

    pub fn config(&self) -> MenuConfig {
        self.config.borrow().clone()
    }

    pub fn controller(&self) -> &MenuController {
        &self.controller
    }

    pub fn set_accessibility_sink(&mut self, sink: Option<Box<dyn AccessibilitySink>>) {
        self.bridge.set_sink(sink);
    }

    pub fn set_theme(&mut self, theme: MenuTheme) {
        self.theme = theme;
        self.controller.set_theme(theme);
    }

    /// Register the menu's own settings and start the title-setup countdown
    pub fn on_launched(&mut self) {
        let api = self.api();
        let owner = OwnerInfo::new(OWN_OWNER_ID, "Config Menu");
        let id = owner.id.clone();

        let reset = {
            let config = self.config.clone();
            move || *config.borrow_mut() = MenuConfig::default()
        };
        let save = {
            let config = self.config.clone();
            let store = self.store.clone();
            move || {
                if let Err(e) = config.borrow().save(store.as_ref()) {
                    tracing::error!("Failed to save menu config: {e}");
                }
            }
        };
        if api.register(owner, reset, save, false).is_err() {
            return;
        }

        let (get, set) = (self.config.clone(), self.config.clone());
        let scroll_speed = OptionDescriptor::integer(
            LazyText::new(|| t!("own_config.scroll_speed").to_string()),
            move || i64::from(get.borrow().scroll_speed),
            move |v| {
                set.borrow_mut().scroll_speed =
                    v.clamp(i64::from(MIN_SCROLL_SPEED), i64::from(MAX_SCROLL_SPEED)) as u32
            },
            Some(i64::from(MIN_SCROLL_SPEED)),
            Some(i64::from(MAX_SCROLL_SPEED)),
        );
        match scroll_speed {
            Ok(descriptor) => {
                api.add_option(
                    &id,
                    None,
                    descriptor
                        .with_field_id("scroll_speed")
                        .with_tooltip(LazyText::new(|| t!("own_config.scroll_speed_tooltip").to_string())),
                );
            }
            Err(e) => tracing::error!("Invalid scroll speed option: {e}"),
        }

        let (get, set) = (self.config.clone(), self.config.clone());
        api.add_option(
            &id,
            None,
            OptionDescriptor::keybinds(
                LazyText::new(|| t!("own_config.open_menu_key").to_string()),
                move || get.borrow().open_menu_key.clone(),
                move |v| set.borrow_mut().open_menu_key = v,
            )
            .with_field_id("open_menu_key")
            .with_tooltip(LazyText::new(|| t!("own_config.open_menu_key_tooltip").to_string())),
        );

        self.countdown = Some(TITLE_SETUP_DELAY);
        tracing::info!("config menu ready");
    }

    /// Per-frame update, before rendering
    pub fn on_update_ticking(&mut self, host: &mut dyn HostMenuStack, input: &FrameInput) {
        if let Some(frames) = self.countdown {
            if frames <= 1 {
                self.countdown = None;
                self.setup_title_ui(host.viewport());
            } else {
                self.countdown = Some(frames - 1);
            }
        }

        self.sync_options_ui(host);

        self.controller
            .set_rows_per_notch(self.config.borrow().rows_per_notch());
        self.process_requests(host);
        self.controller.tick(host, input, &mut self.bridge);

        if self.title_ui_active(host) {
            if let Some(title_ui) = self.title_ui.as_mut() {
                update_overlay(title_ui, input, &mut self.bridge);
            }
        }
        if self.options_ui_active(host) {
            if let Some((_, options_ui)) = self.options_ui.as_mut() {
                update_overlay(options_ui, input, &mut self.bridge);
            }
        }
    }

    pub fn on_rendered(&self, host: &dyn HostMenuStack, frame: &mut Frame) {
        if let Some(overlay) = self.active_overlay(host) {
            overlay.draw(frame, &self.theme);
        }
        self.controller.draw(host, frame);
    }

    pub fn on_window_resized(&mut self, viewport: Rect) {
        self.controller.resize(viewport);
        if let Some(title_ui) = self.title_ui.as_mut() {
            title_ui.resize(viewport);
        }
        if let Some((_, options_ui)) = self.options_ui.as_mut() {
            options_ui.resize(viewport);
        }
    }

    /// Route a discrete input event. Returns true when the host should ignore it.
    pub fn on_input(&mut self, host: &mut dyn HostMenuStack, event: &Event) -> bool {
        if self.controller.handle_input(host, event) {
            return true;
        }
        let overlay = if self.title_ui_active(host) {
            self.title_ui.as_mut()
        } else if self.options_ui_active(host) {
            self.options_ui.as_mut().map(|(_, ui)| ui)
        } else {
            None
        };
        if overlay.is_some_and(|ui| ui.handle_input(event)) {
            self.process_requests(host);
            return true;
        }
        pressed_chord(event).is_some_and(|chord| self.on_buttons_changed(host, &chord))
    }

    /// The set of held buttons changed (newest last). Opens the mod list when
    /// the open-menu keybind was just completed and the player is free.
    pub fn on_buttons_changed(&mut self, host: &mut dyn HostMenuStack, pressed: &[InputButton]) -> bool {
        if !host.is_player_free() || !self.config.borrow().open_menu_key.just_pressed(pressed) {
            return false;
        }
        self.open_list_menu(host);
        true
    }

    pub fn open_list_menu(&mut self, host: &mut dyn HostMenuStack) {
        self.controller.open_list(host, 0);
    }

    /// Trigger action: open the menu of the owner named by the first argument
    pub fn run_open_mod_config_action(
        &mut self,
        host: &mut dyn HostMenuStack,
        args: &[&str],
        is_loaded: impl Fn(&OwnerId) -> bool,
    ) -> Result<(), OpenModConfigError> {
        let Some(owner) = args.first().map(|id| OwnerId::new(*id)) else {
            return Err(OpenModConfigError::NotEnoughArguments);
        };
        if !is_loaded(&owner) {
            return Err(OpenModConfigError::NotLoaded(owner));
        }
        self.controller
            .open_mod_menu(host, &owner)
            .map(|_| ())
            .map_err(|_| OpenModConfigError::NotRegistered(owner))
    }

    /// A lone button that opens the mod list
    fn list_button(&self, viewport: Rect, label: String, anchor: Anchor) -> RootElement {
        let mut root = RootElement::new(viewport);
        let requests = self.requests.clone();
        let open_list: Callback =
            Rc::new(move |_| requests.borrow_mut().push_back(MenuRequest::OpenList));
        root.add_child(Element::Button(ButtonState::new(label).with_base(
            ElementBase::default()
                .with_anchor(anchor)
                .with_callback(open_list),
        )));
        root
    }

    fn setup_title_ui(&mut self, viewport: Rect) {
        let label = t!("menu.list_title").to_string();
        self.title_ui = Some(self.list_button(viewport, label, Anchor::bottom_left(2, 1)));
        tracing::debug!("title screen button added");
    }

    /// Follow the host's options page: add the button when it opens, drop it
    /// when it closes
    fn sync_options_ui(&mut self, host: &dyn HostMenuStack) {
        let page = host.options_page();
        if self.options_ui.as_ref().map(|(shown, _)| *shown) == page {
            return;
        }
        let options_ui = page.map(|page| {
            tracing::debug!(menu = page.0, "mod options button added to options page");
            let label = t!("menu.mod_options_button").to_string();
            (page, self.list_button(host.viewport(), label, Anchor::bottom_right(2, 1)))
        });
        self.options_ui = options_ui;
    }

    fn title_ui_active(&self, host: &dyn HostMenuStack) -> bool {
        self.title_ui.is_some()
            && host.is_title_screen()
            && host.is_title_interactable()
            && host.title_submenu().is_none()
    }

    /// The options page is showing with nothing of ours on top
    fn options_ui_active(&self, host: &dyn HostMenuStack) -> bool {
        self.options_ui
            .as_ref()
            .is_some_and(|(page, _)| active_config_menu(host) == Some(*page))
    }

    fn active_overlay(&self, host: &dyn HostMenuStack) -> Option<&RootElement> {
        if self.title_ui_active(host) {
            self.title_ui.as_ref()
        } else if self.options_ui_active(host) {
            self.options_ui.as_ref().map(|(_, ui)| ui)
        } else {
            None
        }
    }

    fn process_requests(&mut self, host: &mut dyn HostMenuStack) {
        loop {
            let request = self.requests.borrow_mut().pop_front();
            let Some(request) = request else {
                break;
            };
            match request {
                MenuRequest::OpenList => self.open_list_menu(host),
                MenuRequest::OpenMod(owner) => {
                    if let Err(e) = self.controller.open_mod_menu(host, &owner) {
                        self.log.report(&owner, &e);
                    }
                }
            }
        }
    }
}

/// Frame update for a button overlay; hovers are spoken only with a reader attached
fn update_overlay(ui: &mut RootElement, input: &FrameInput, bridge: &mut ScreenReaderBridge) {
    ui.update(input);
    let notices = ui.take_notices();
    if !bridge.is_active() {
        return;
    }
    for (index, notice) in notices {
        if let (Notice::Hovered, Some(element)) = (notice, ui.child(index)) {
            bridge.on_hovered(element);
        }
    }
}
