//! Menu controller
//!
//! Owns the widget trees of the menus it opened, keyed by host menu id. Which
//! menu is showing is always read back from the host through
//! `HostMenuStack`; menus the host dropped are discarded on the next tick.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;
use rust_i18n::t;

use super::host::{active_config_menu, set_active_config_menu, visible_menus, HostMenuStack, MenuId};
use super::navigation::{KeybindTarget, Screen, Transition};
use super::screens::{self, BuiltScreen, CommandQueue, MenuCommand, ScreenContext};
use crate::input::FrameInput;
use crate::model::{
    ModConfig, ModConfigManager, OptionKind, OptionValue, OwnerHooks, OwnerId, RegistrationError,
};
use crate::services::integration_log::IntegrationLog;
use crate::view::controls::{CaptureResult, Element, KeybindEditorState, Notice};
use crate::view::screen_reader::ScreenReaderBridge;
use crate::view::theme::MenuTheme;
use crate::view::ui::RootElement;

struct OpenMenu {
    screen: Screen,
    built: BuiltScreen,
}

pub struct MenuController {
    menus: HashMap<MenuId, OpenMenu>,
    commands: CommandQueue,
    manager: Rc<RefCell<ModConfigManager>>,
    log: Rc<IntegrationLog>,
    theme: MenuTheme,
    rows_per_notch: usize,
}

impl MenuController {
    pub fn new(manager: Rc<RefCell<ModConfigManager>>, log: Rc<IntegrationLog>) -> Self {
        Self {
            menus: HashMap::new(),
            commands: CommandQueue::default(),
            manager,
            log,
            theme: MenuTheme::default(),
            rows_per_notch: 3,
        }
    }

    pub fn set_theme(&mut self, theme: MenuTheme) {
        self.theme = theme;
    }

    pub fn set_rows_per_notch(&mut self, rows: usize) {
        self.rows_per_notch = rows.max(1);
    }

    fn active_id(&self, host: &dyn HostMenuStack) -> Option<MenuId> {
        active_config_menu(host).filter(|id| self.menus.contains_key(id))
    }

    /// One of our menus is the one the host shows on top
    pub fn is_open(&self, host: &dyn HostMenuStack) -> bool {
        self.active_id(host).is_some()
    }

    pub fn active_screen(&self, host: &dyn HostMenuStack) -> Option<&Screen> {
        self.active_id(host)
            .and_then(|id| self.menus.get(&id))
            .map(|m| &m.screen)
    }

    pub fn active_root(&self, host: &dyn HostMenuStack) -> Option<&RootElement> {
        self.active_id(host)
            .and_then(|id| self.menus.get(&id))
            .map(|m| &m.built.root)
    }

    /// Number of menus this controller currently keeps alive
    pub fn open_menu_count(&self) -> usize {
        self.menus.len()
    }

    /// Show the mod list scrolled to `scroll_row`
    pub fn open_list(&mut self, host: &mut dyn HostMenuStack, scroll_row: usize) -> MenuId {
        self.open(host, Screen::List { scroll_row })
    }

    /// Open an owner's pages directly, without the list behind them
    pub fn open_mod_menu(
        &mut self,
        host: &mut dyn HostMenuStack,
        owner: &OwnerId,
    ) -> Result<MenuId, RegistrationError> {
        self.manager.borrow().require(owner)?;
        Ok(self.open(host, Screen::direct(owner.clone())))
    }

    /// Close every menu we opened, committing any text being edited first
    pub fn close_all(&mut self, host: &mut dyn HostMenuStack) {
        while let Some(id) = self.active_id(host) {
            self.close(host, id);
        }
        for (_, mut menu) in self.menus.drain() {
            menu.built.root.release_focus();
        }
        self.commands.borrow_mut().clear();
    }

    /// Queue a command for the active menu and run it
    pub fn dispatch(&mut self, host: &mut dyn HostMenuStack, command: MenuCommand) {
        self.commands.borrow_mut().push_back(command);
        self.process_commands(host);
    }

    /// Per-frame update of the active menu
    pub fn tick(
        &mut self,
        host: &mut dyn HostMenuStack,
        input: &FrameInput,
        bridge: &mut ScreenReaderBridge,
    ) {
        self.prune(host);
        let world_ready = host.is_world_ready();
        let Some(menu) = self.active_id(host).and_then(|id| self.menus.get_mut(&id)) else {
            return;
        };
        menu.built.apply_session_state(world_ready);
        menu.built.root.update(input);
        let notices = menu.built.root.take_notices();
        if bridge.is_active() {
            for (index, notice) in notices {
                let Some(element) = menu.built.root.child(index) else {
                    continue;
                };
                match notice {
                    Notice::Hovered => bridge.on_hovered(element),
                    Notice::Changed => bridge.on_changed(element),
                };
            }
        }
        self.process_commands(host);
    }

    /// Route an input event. Returns true when one of our menus is showing,
    /// in which case the host should not act on the event itself.
    pub fn handle_input(&mut self, host: &mut dyn HostMenuStack, event: &Event) -> bool {
        self.prune(host);
        let rows = self.rows_per_notch as isize;
        let Some(menu) = self.active_id(host).and_then(|id| self.menus.get_mut(&id)) else {
            return false;
        };

        if !menu.built.root.handle_input(event) {
            match event {
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => menu.built.root.scroll_by(rows),
                    MouseEventKind::ScrollUp => menu.built.root.scroll_by(-rows),
                    _ => {}
                },
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Esc => self.commands.borrow_mut().push_back(MenuCommand::Back),
                    KeyCode::PageDown => menu.built.root.scroll_by(rows * 4),
                    KeyCode::PageUp => menu.built.root.scroll_by(-rows * 4),
                    _ => {}
                },
                _ => {}
            }
        }
        self.process_commands(host);
        true
    }

    pub fn draw(&self, host: &dyn HostMenuStack, frame: &mut Frame) {
        let Some(menu) = self.active_id(host).and_then(|id| self.menus.get(&id)) else {
            return;
        };
        let area = frame.area();
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(self.theme.popup_bg)), area);
        menu.built.root.draw(frame, &self.theme);

        if let Some(tooltip) = menu.built.root.hovered_tooltip() {
            let line = Rect::new(
                area.x + 2,
                area.bottom().saturating_sub(1),
                area.width.saturating_sub(4),
                1,
            );
            frame.render_widget(
                Paragraph::new(tooltip).style(Style::default().fg(self.theme.tooltip)),
                line,
            );
        }
    }

    /// Re-anchor every open menu for a new viewport
    pub fn resize(&mut self, viewport: Rect) {
        for menu in self.menus.values_mut() {
            menu.built.root.resize(viewport);
            menu.built.root.set_body(screens::body_rect(viewport));
        }
    }

    fn build(&self, host: &dyn HostMenuStack, screen: &Screen) -> BuiltScreen {
        let manager = self.manager.borrow();
        let ctx = ScreenContext {
            manager: &manager,
            log: &self.log,
            commands: &self.commands,
            viewport: host.viewport(),
            world_ready: host.is_world_ready(),
        };
        let mut built = screens::build(screen, &ctx);
        if let Screen::List { scroll_row } = screen {
            built.root.set_scroll_row(*scroll_row);
        }
        built
    }

    fn open(&mut self, host: &mut dyn HostMenuStack, screen: Screen) -> MenuId {
        let built = self.build(host, &screen);
        let id = host.create_menu();
        tracing::debug!(menu = id.0, ?screen, "opening menu");
        self.menus.insert(id, OpenMenu { screen, built });
        set_active_config_menu(host, Some(id));
        self.commands.borrow_mut().clear();
        id
    }

    fn close(&mut self, host: &mut dyn HostMenuStack, id: MenuId) {
        if let Some(mut menu) = self.menus.remove(&id) {
            menu.built.root.release_focus();
            tracing::debug!(menu = id.0, "closing menu");
        }
        if active_config_menu(host) == Some(id) {
            set_active_config_menu(host, None);
        }
        self.commands.borrow_mut().clear();
    }

    /// Forget menus the host no longer shows
    fn prune(&mut self, host: &dyn HostMenuStack) {
        let visible = visible_menus(host);
        let gone: Vec<MenuId> = self
            .menus
            .keys()
            .filter(|id| !visible.contains(id))
            .copied()
            .collect();
        if gone.is_empty() {
            return;
        }
        for id in gone {
            if let Some(mut menu) = self.menus.remove(&id) {
                menu.built.root.release_focus();
                tracing::debug!(menu = id.0, "menu closed by host");
            }
        }
        self.commands.borrow_mut().clear();
    }

    fn process_commands(&mut self, host: &mut dyn HostMenuStack) {
        loop {
            let command = self.commands.borrow_mut().pop_front();
            let Some(command) = command else {
                break;
            };
            self.run(host, command);
        }
    }

    fn run(&mut self, host: &mut dyn HostMenuStack, command: MenuCommand) {
        let Some(id) = self.active_id(host) else {
            self.commands.borrow_mut().clear();
            return;
        };
        tracing::trace!(menu = id.0, ?command, "menu command");
        match command {
            MenuCommand::SelectOwner(owner) => {
                let list_scroll_row = self.scroll_row(id);
                self.navigate(host, id, Transition::SelectOwner { owner, list_scroll_row });
            }
            MenuCommand::OpenKeybindings => {
                let list_scroll_row = self.scroll_row(id);
                self.navigate(host, id, Transition::OpenKeybindings { list_scroll_row });
            }
            MenuCommand::OpenPage(page) => self.navigate(host, id, Transition::OpenPage(page)),
            MenuCommand::Back => self.navigate(host, id, Transition::Back),
            MenuCommand::Save => {
                self.save(id);
                self.rebuild(host, id);
            }
            MenuCommand::SaveAndClose => {
                self.save(id);
                self.navigate(host, id, Transition::ReturnToList);
            }
            MenuCommand::Reset => {
                self.reset(id);
                self.rebuild(host, id);
            }
            MenuCommand::EditKeybind(index) => self.open_keybind_editor(id, index),
            MenuCommand::KeybindFinished => self.finish_keybind_editor(id),
            MenuCommand::ValueChanged(index) => self.value_changed(id, index),
        }
    }

    fn scroll_row(&self, id: MenuId) -> usize {
        self.menus
            .get(&id)
            .map(|m| m.built.root.scroll_row())
            .unwrap_or(0)
    }

    fn navigate(&mut self, host: &mut dyn HostMenuStack, id: MenuId, transition: Transition) {
        let Some(from) = self.menus.get(&id).map(|m| m.screen.clone()) else {
            return;
        };
        let Some(next) = from.clone().apply(transition) else {
            self.close(host, id);
            return;
        };
        if next == from {
            return;
        }
        match (&from, &next) {
            (Screen::List { .. }, _) => self.open_nested(host, id, next),
            (_, Screen::List { scroll_row }) => self.return_to_list(host, id, *scroll_row),
            _ => self.replace(host, id, next),
        }
    }

    /// Open a screen on top of the list. On the title screen the submenu slot
    /// holds one menu, so the list is dropped and rebuilt on return.
    fn open_nested(&mut self, host: &mut dyn HostMenuStack, list: MenuId, next: Screen) {
        if host.is_title_screen() {
            self.close(host, list);
        }
        self.open(host, next);
    }

    fn return_to_list(&mut self, host: &mut dyn HostMenuStack, id: MenuId, scroll_row: usize) {
        let parent = if host.is_title_screen() {
            None
        } else {
            host.parent_menu(id)
        };
        self.close(host, id);

        let parent_list = parent.and_then(|p| self.menus.get_mut(&p)).filter(|m| {
            matches!(m.screen, Screen::List { .. })
        });
        match parent_list {
            Some(list) => {
                list.screen = Screen::List { scroll_row };
                list.built.root.set_scroll_row(scroll_row);
            }
            None => {
                self.open_list(host, scroll_row);
            }
        }
    }

    /// Swap the screen shown by `id` without touching the host's menu slots
    fn replace(&mut self, host: &dyn HostMenuStack, id: MenuId, next: Screen) {
        let built = self.build(host, &next);
        if let Some(menu) = self.menus.get_mut(&id) {
            menu.screen = next;
            menu.built = built;
        }
        self.commands.borrow_mut().clear();
    }

    fn rebuild(&mut self, host: &dyn HostMenuStack, id: MenuId) {
        let Some(screen) = self.menus.get(&id).map(|m| m.screen.clone()) else {
            return;
        };
        let scroll_row = self.scroll_row(id);
        self.replace(host, id, screen);
        if let Some(menu) = self.menus.get_mut(&id) {
            menu.built.root.set_scroll_row(scroll_row);
        }
    }

    /// Owners whose callbacks a save or reset on this menu affects
    fn owners(menu: &OpenMenu) -> Vec<OwnerId> {
        if let Some(owner) = menu.screen.owner() {
            return vec![owner.clone()];
        }
        let mut owners: Vec<OwnerId> = Vec::new();
        for row in &menu.built.rows {
            if !owners.contains(&row.owner) {
                owners.push(row.owner.clone());
            }
        }
        owners
    }

    /// Callbacks of every owner a save or reset on this menu affects. They are
    /// cloned out so no registry borrow is held while owner code runs.
    fn owner_hooks(&self, menu: &OpenMenu) -> Vec<OwnerHooks> {
        let manager = self.manager.borrow();
        Self::owners(menu)
            .iter()
            .filter_map(|owner| manager.get(owner, false).ok().flatten())
            .map(ModConfig::hooks)
            .collect()
    }

    /// Write the values the user edited through their setters, then run the
    /// owners' save callbacks. Untouched rows are never written.
    fn save(&mut self, id: MenuId) {
        if let Some(index) = self
            .menus
            .get_mut(&id)
            .and_then(|menu| menu.built.root.release_focus())
        {
            self.value_changed(id, index);
        }
        let Some(menu) = self.menus.get(&id) else {
            return;
        };

        for row in menu.built.rows.iter().filter(|row| row.changed) {
            let Some(element) = menu.built.root.child(row.index) else {
                continue;
            };
            if !element.base().enabled || row.option.kind() == OptionKind::Keybinds {
                continue;
            }
            let Some(value) = screens::pending_value(element, &row.option) else {
                let name = row.option.name();
                let message = match row.option.kind() {
                    OptionKind::Choice => format!("option '{name}': no choice selected"),
                    _ => format!("option '{name}': value is not a valid number"),
                };
                self.log.report(&row.owner, &message);
                continue;
            };
            if let Err(e) = row.option.write(value) {
                self.log
                    .report(&row.owner, &format_args!("option '{}': {e}", row.option.name()));
            }
        }

        for hooks in self.owner_hooks(menu) {
            tracing::info!(owner = %hooks.owner(), "saving config");
            if let Err(e) = hooks.save() {
                self.log
                    .report_error(hooks.owner(), &format_args!("save failed: {e:#}"));
            }
        }
    }

    /// Run the owners' reset callbacks and persist the defaults
    fn reset(&mut self, id: MenuId) {
        let Some(menu) = self.menus.get_mut(&id) else {
            return;
        };
        menu.built.root.release_focus();
        let hooks = self
            .menus
            .get(&id)
            .map(|menu| self.owner_hooks(menu))
            .unwrap_or_default();
        for hooks in hooks {
            tracing::info!(owner = %hooks.owner(), "resetting config");
            if let Err(e) = hooks.reset().and_then(|()| hooks.save()) {
                self.log
                    .report_error(hooks.owner(), &format_args!("reset failed: {e:#}"));
            }
        }
    }

    fn hooks_for(&self, owner: &OwnerId) -> Option<OwnerHooks> {
        let manager = self.manager.borrow();
        manager.get(owner, false).ok().flatten().map(ModConfig::hooks)
    }

    fn open_keybind_editor(&mut self, id: MenuId, index: usize) {
        let Some(menu) = self.menus.get_mut(&id) else {
            return;
        };
        if matches!(menu.screen, Screen::KeybindEditor { .. }) {
            return;
        }
        let Some(row) = menu.built.row(index).cloned() else {
            return;
        };
        let original = match row.option.read() {
            Ok(OptionValue::Keybinds(list)) => list,
            Ok(_) => return,
            Err(e) => {
                self.log
                    .report_error(&row.owner, &format_args!("option '{}': {e}", row.option.name()));
                return;
            }
        };

        let mut editor = KeybindEditorState::new(row.option.name(), original);
        editor.base.local_position = screens::centered(menu.built.root.viewport(), editor.size());
        editor.base.callback = Some(screens::send(&self.commands, MenuCommand::KeybindFinished));
        editor.base.screen_reader_text = Some(t!("keybind_editor.prompt").to_string());
        let editor_index = menu.built.root.add_child(Element::KeybindEditor(editor));
        menu.built.root.capture(editor_index);

        let target = KeybindTarget {
            owner: row.owner,
            page: row.page,
            entry: row.entry,
        };
        if let Some(next) = menu.screen.clone().apply(Transition::OpenKeybindEditor(target)) {
            menu.screen = next;
        }
    }

    /// Close the capture popup. A captured chord is written at once; a
    /// cancelled capture writes nothing.
    fn finish_keybind_editor(&mut self, id: MenuId) {
        let Some(menu) = self.menus.get_mut(&id) else {
            return;
        };
        let Screen::KeybindEditor { target, .. } = &menu.screen else {
            return;
        };
        let target = target.clone();
        let Some(editor_index) = menu.built.root.len().checked_sub(1) else {
            return;
        };
        let outcome = match menu.built.root.child(editor_index) {
            Some(Element::KeybindEditor(editor)) => editor.outcome.clone(),
            _ => return,
        };
        menu.built.root.truncate(editor_index);
        if let Some(next) = menu.screen.clone().apply(Transition::FinishKeybindEditor) {
            menu.screen = next;
        }

        let Some(CaptureResult::Captured(list)) = outcome else {
            return;
        };
        let Some(row) = menu
            .built
            .rows
            .iter()
            .find(|r| r.owner == target.owner && r.page == target.page && r.entry == target.entry)
            .cloned()
        else {
            return;
        };
        let value = OptionValue::Keybinds(list.clone());
        if let Err(e) = row.option.write(value.clone()) {
            self.log
                .report(&row.owner, &format_args!("option '{}': {e}", row.option.name()));
            return;
        }
        if let Some(Element::Label(label)) = menu.built.root.child_mut(row.index) {
            label.text = list.to_string();
            label.input_listener = Some(list);
        }
        menu.built.root.relayout_child(row.index);

        if let (Some(field_id), Some(hooks)) =
            (row.option.field_id.as_deref(), self.hooks_for(&row.owner))
        {
            hooks.notify_field_changed(field_id, &value);
        }
    }

    /// Mark the row edited and tell the owner's field-changed hooks
    fn value_changed(&mut self, id: MenuId, index: usize) {
        let Some(menu) = self.menus.get_mut(&id) else {
            return;
        };
        let Some(row) = menu.built.row_mut(index) else {
            return;
        };
        row.changed = true;
        let row = row.clone();
        let Some(field_id) = row.option.field_id.as_deref() else {
            return;
        };
        let Some(value) = menu
            .built
            .root
            .child(index)
            .and_then(|element| screens::pending_value(element, &row.option))
        else {
            return;
        };
        if let Some(hooks) = self.hooks_for(&row.owner) {
            hooks.notify_field_changed(field_id, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Keybind, KeybindList};
    use crate::menu::host::InMemoryMenuStack;
    use crate::model::{ModConfig, OptionDescriptor, OwnerInfo, PageId};
    use crate::view::controls::test_util::{key, mouse, mouse_down};
    use std::cell::Cell;

    struct Fixture {
        controller: MenuController,
        sound: Rc<Cell<bool>>,
        binds: Rc<RefCell<KeybindList>>,
        saves: Rc<Cell<u32>>,
    }

    fn fixture(extra_owners: usize) -> Fixture {
        let sound = Rc::new(Cell::new(true));
        let binds = Rc::new(RefCell::new(KeybindList::single(Keybind::key(KeyCode::F(5)))));
        let saves = Rc::new(Cell::new(0));

        let counter = saves.clone();
        let mut config = ModConfig::new(
            OwnerInfo::new("a.mod", "A Mod"),
            || {},
            move || counter.set(counter.get() + 1),
            false,
        );
        let (get, set) = (sound.clone(), sound.clone());
        config.add_option(
            None,
            OptionDescriptor::boolean("Sound", move || get.get(), move |v| set.set(v)),
        );
        let (get, set) = (binds.clone(), binds.clone());
        config.add_option(
            None,
            OptionDescriptor::keybinds(
                "Open",
                move || get.borrow().clone(),
                move |v| *set.borrow_mut() = v,
            ),
        );
        config.add_page_link(None, PageId::new("audio"), "Audio", None);
        config.add_paragraph(Some(PageId::new("audio")), "Audio settings");

        let mut manager = ModConfigManager::new();
        manager.register(config, false).unwrap();
        for i in 0..extra_owners {
            let id = format!("filler.{i}");
            manager
                .register(ModConfig::new(OwnerInfo::new(id.clone(), id), || {}, || {}, false), false)
                .unwrap();
        }

        let mut controller =
            MenuController::new(Rc::new(RefCell::new(manager)), Rc::new(IntegrationLog::new()));
        controller.set_rows_per_notch(1);
        Fixture {
            controller,
            sound,
            binds,
            saves,
        }
    }

    fn viewport() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    fn owner() -> OwnerId {
        OwnerId::new("a.mod")
    }

    fn scroll_down(controller: &mut MenuController, host: &mut InMemoryMenuStack, notches: usize) {
        for _ in 0..notches {
            controller.handle_input(host, &mouse(MouseEventKind::ScrollDown, 10, 10));
        }
    }

    #[test]
    fn test_list_detail_round_trip_restores_scroll_row_in_session() {
        let Fixture { mut controller, .. } = fixture(40);
        let mut host = InMemoryMenuStack::in_session(viewport());
        let game_menu = host.open_host_menu();

        let list = controller.open_list(&mut host, 0);
        scroll_down(&mut controller, &mut host, 7);
        assert_eq!(controller.active_root(&host).unwrap().scroll_row(), 7);

        controller.dispatch(&mut host, MenuCommand::SelectOwner(owner()));
        let detail = active_config_menu(&host).unwrap();
        assert_eq!(host.parent_menu(detail), Some(list));

        controller.dispatch(&mut host, MenuCommand::OpenPage(PageId::new("audio")));
        assert_eq!(active_config_menu(&host), Some(detail));
        controller.dispatch(&mut host, MenuCommand::Back);
        controller.dispatch(&mut host, MenuCommand::Back);

        assert_eq!(active_config_menu(&host), Some(list));
        assert_eq!(
            controller.active_screen(&host),
            Some(&Screen::List { scroll_row: 7 })
        );
        assert_eq!(controller.active_root(&host).unwrap().scroll_row(), 7);

        controller.dispatch(&mut host, MenuCommand::Back);
        assert_eq!(active_config_menu(&host), Some(game_menu));
        assert_eq!(controller.open_menu_count(), 0);
    }

    #[test]
    fn test_title_screen_replaces_submenu_and_rebuilds_list() {
        let Fixture { mut controller, .. } = fixture(40);
        let mut host = InMemoryMenuStack::on_title_screen(viewport());

        controller.open_list(&mut host, 0);
        scroll_down(&mut controller, &mut host, 7);
        controller.dispatch(&mut host, MenuCommand::SelectOwner(owner()));
        assert_eq!(controller.open_menu_count(), 1);
        assert!(matches!(controller.active_screen(&host), Some(Screen::Detail(_))));

        controller.dispatch(&mut host, MenuCommand::Back);
        assert_eq!(
            controller.active_screen(&host),
            Some(&Screen::List { scroll_row: 7 })
        );
        assert_eq!(controller.active_root(&host).unwrap().scroll_row(), 7);
        assert_eq!(host.title_submenu(), active_config_menu(&host));
    }

    #[test]
    fn test_direct_open_back_closes() {
        let Fixture { mut controller, .. } = fixture(0);
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();
        assert!(controller.is_open(&host));
        controller.handle_input(&mut host, &key(KeyCode::Esc));
        assert!(!controller.is_open(&host));
        assert_eq!(host.active_menu(), None);

        let missing = controller.open_mod_menu(&mut host, &OwnerId::new("nope"));
        assert!(matches!(missing, Err(RegistrationError::NotRegistered(_))));
    }

    #[test]
    fn test_save_writes_pending_values_and_calls_owner() {
        let Fixture {
            mut controller,
            sound,
            saves,
            ..
        } = fixture(0);
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();

        let checkbox = controller
            .active_root(&host)
            .unwrap()
            .children()
            .iter()
            .find(|c| matches!(c, Element::Checkbox(_)))
            .map(|c| c.base().bounds)
            .unwrap();
        controller.handle_input(&mut host, &mouse_down(checkbox.x, checkbox.y));
        assert!(sound.get(), "nothing is written before saving");

        controller.dispatch(&mut host, MenuCommand::Save);
        assert!(!sound.get());
        assert_eq!(saves.get(), 1);
    }

    #[test]
    fn test_back_discards_pending_values() {
        let Fixture {
            mut controller,
            sound,
            saves,
            ..
        } = fixture(0);
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();
        let checkbox = controller
            .active_root(&host)
            .unwrap()
            .children()
            .iter()
            .find(|c| matches!(c, Element::Checkbox(_)))
            .map(|c| c.base().bounds)
            .unwrap();
        controller.handle_input(&mut host, &mouse_down(checkbox.x, checkbox.y));
        controller.dispatch(&mut host, MenuCommand::Back);
        assert!(sound.get());
        assert_eq!(saves.get(), 0);
    }

    fn keybind_row(controller: &MenuController, host: &InMemoryMenuStack) -> usize {
        controller
            .active_root(host)
            .unwrap()
            .children()
            .iter()
            .position(|c| matches!(c, Element::Label(l) if l.input_listener.is_some()))
            .unwrap()
    }

    #[test]
    fn test_keybind_capture_cancel_keeps_value() {
        let Fixture {
            mut controller,
            binds,
            ..
        } = fixture(0);
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();
        let before = binds.borrow().clone();

        let row = keybind_row(&controller, &host);
        controller.dispatch(&mut host, MenuCommand::EditKeybind(row));
        assert!(matches!(
            controller.active_screen(&host),
            Some(Screen::KeybindEditor { .. })
        ));

        controller.handle_input(&mut host, &key(KeyCode::Esc));
        assert!(matches!(controller.active_screen(&host), Some(Screen::Detail(_))));
        assert!(controller.is_open(&host), "Esc only closes the popup");
        assert_eq!(*binds.borrow(), before);
    }

    #[test]
    fn test_keybind_capture_writes_immediately() {
        let Fixture {
            mut controller,
            binds,
            ..
        } = fixture(0);
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();

        let row = keybind_row(&controller, &host);
        controller.dispatch(&mut host, MenuCommand::EditKeybind(row));
        controller.handle_input(&mut host, &key(KeyCode::F(7)));

        assert_eq!(*binds.borrow(), KeybindList::single(Keybind::key(KeyCode::F(7))));
        match controller.active_root(&host).unwrap().child(row) {
            Some(Element::Label(label)) => assert_eq!(label.text, "F7"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_menus_closed_by_host_are_pruned() {
        let Fixture { mut controller, .. } = fixture(0);
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_list(&mut host, 0);
        host.set_active_menu(None);
        controller.tick(&mut host, &FrameInput::default(), &mut ScreenReaderBridge::new());
        assert_eq!(controller.open_menu_count(), 0);
    }

    #[test]
    fn test_untouched_values_survive_save_and_close() {
        let float = Rc::new(Cell::new(0.1234567));
        let int = Rc::new(Cell::new(9_007_199_254_740_993_i64));
        let choice = Rc::new(RefCell::new("legacy".to_string()));
        let writes = Rc::new(Cell::new(0));

        let mut config = ModConfig::new(OwnerInfo::new("a.mod", "A Mod"), || {}, || {}, false);
        let (get, count) = (float.clone(), writes.clone());
        config.add_option(
            None,
            OptionDescriptor::float(
                "Ratio",
                move || get.get(),
                move |_| count.set(count.get() + 1),
                Some(0.0),
                Some(1.0),
            )
            .unwrap()
            .with_interval(0.1),
        );
        let (get, count) = (int.clone(), writes.clone());
        config.add_option(
            None,
            OptionDescriptor::integer(
                "Seed",
                move || get.get(),
                move |_| count.set(count.get() + 1),
                Some(0),
                Some(i64::MAX),
            )
            .unwrap(),
        );
        let (get, count) = (choice.clone(), writes.clone());
        config.add_option(
            None,
            OptionDescriptor::choice(
                "Mode",
                move || get.borrow().clone(),
                move |_| count.set(count.get() + 1),
                vec!["a".into(), "b".into()],
            ),
        );
        let mut manager = ModConfigManager::new();
        manager.register(config, false).unwrap();
        let log = Rc::new(IntegrationLog::new());
        let mut controller = MenuController::new(Rc::new(RefCell::new(manager)), log.clone());
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();

        let root = controller.active_root(&host).unwrap();
        let unavailable = root
            .children()
            .iter()
            .any(|c| matches!(c, Element::Label(l) if l.text == t!("menu.unavailable")));
        assert!(unavailable);
        assert!(log.was_reported(
            &owner(),
            "option 'Mode': value 'legacy' is not one of its choices"
        ));

        controller.dispatch(&mut host, MenuCommand::SaveAndClose);
        assert_eq!(writes.get(), 0);
        assert_eq!(float.get(), 0.1234567);
        assert_eq!(int.get(), 9_007_199_254_740_993);
        assert_eq!(*choice.borrow(), "legacy");
    }

    #[test]
    fn test_empty_choice_list_is_unavailable() {
        let mut config = ModConfig::new(OwnerInfo::new("a.mod", "A Mod"), || {}, || {}, false);
        config.add_option(
            None,
            OptionDescriptor::choice("Mode", String::new, |_| {}, Vec::new()),
        );
        let mut manager = ModConfigManager::new();
        manager.register(config, false).unwrap();
        let log = Rc::new(IntegrationLog::new());
        let mut controller = MenuController::new(Rc::new(RefCell::new(manager)), log.clone());
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();
        assert!(log.was_reported(&owner(), "option 'Mode': has no choices"));
        assert!(!log.was_reported(&owner(), "option 'Mode': value is not a valid number"));
    }

    #[test]
    fn test_save_callback_may_unregister_its_owner() {
        let manager = Rc::new(RefCell::new(ModConfigManager::new()));
        let registry = manager.clone();
        let config = ModConfig::new(
            OwnerInfo::new("a.mod", "A Mod"),
            || {},
            move || {
                registry.borrow_mut().unregister(&OwnerId::new("a.mod"));
            },
            false,
        );
        manager.borrow_mut().register(config, false).unwrap();
        let log = Rc::new(IntegrationLog::new());
        let mut controller = MenuController::new(manager.clone(), log.clone());
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();

        controller.dispatch(&mut host, MenuCommand::Save);
        assert!(!manager.borrow().contains(&owner()));
        assert!(!log.was_reported(&owner(), "save failed: owner callback panicked"));
    }

    #[test]
    fn test_field_changed_hook_may_add_options() {
        let manager = Rc::new(RefCell::new(ModConfigManager::new()));
        let mut config = ModConfig::new(OwnerInfo::new("a.mod", "A Mod"), || {}, || {}, false);
        config.add_option(
            None,
            OptionDescriptor::boolean("Sound", || true, |_| {}).with_field_id("sound"),
        );
        let registry = manager.clone();
        config.on_field_changed(move |_, _| {
            if let Ok(config) = registry.borrow_mut().require_mut(&OwnerId::new("a.mod")) {
                config.add_paragraph(None, "Sound changed");
            }
        });
        manager.borrow_mut().register(config, false).unwrap();
        let mut controller = MenuController::new(manager.clone(), Rc::new(IntegrationLog::new()));
        let mut host = InMemoryMenuStack::in_session(viewport());
        controller.open_mod_menu(&mut host, &owner()).unwrap();

        let checkbox = controller
            .active_root(&host)
            .unwrap()
            .children()
            .iter()
            .find(|c| matches!(c, Element::Checkbox(_)))
            .map(|c| c.base().bounds)
            .unwrap();
        controller.handle_input(&mut host, &mouse_down(checkbox.x, checkbox.y));
        let entries = manager.borrow().require(&owner()).unwrap().root().entries.len();
        assert_eq!(entries, 2);
    }
}
