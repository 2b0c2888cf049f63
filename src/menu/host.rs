//! Host menu-stack abstraction
//!
//! The host owns a single "active menu" slot with parent/child chaining, plus
//! a separate submenu slot that is used instead while its title screen is up.
//! All reads and writes of those slots go through `HostMenuStack`, so the
//! navigation logic can run against `InMemoryMenuStack` in tests and in
//! headless hosts.

use std::collections::HashMap;

use ratatui::layout::Rect;

/// Handle of a menu living in the host's menu stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(pub u64);

/// The host's menu slots and session predicates
pub trait HostMenuStack {
    /// Allocate a handle for a new menu shell owned by this crate
    fn create_menu(&mut self) -> MenuId;

    fn active_menu(&self) -> Option<MenuId>;
    fn set_active_menu(&mut self, menu: Option<MenuId>);

    fn child_menu(&self, menu: MenuId) -> Option<MenuId>;
    /// Attach `child` below `menu` (updating its parent link), or detach the
    /// current child when `None`
    fn set_child_menu(&mut self, menu: MenuId, child: Option<MenuId>);
    fn parent_menu(&self, menu: MenuId) -> Option<MenuId>;

    /// The idle/title screen is showing; menus go through the submenu slot
    fn is_title_screen(&self) -> bool;
    fn title_submenu(&self) -> Option<MenuId>;
    fn set_title_submenu(&mut self, menu: Option<MenuId>);

    /// Whether the title screen accepts clicks (not mid-transition)
    fn is_title_interactable(&self) -> bool {
        self.is_title_screen()
    }

    /// A save is loaded
    fn is_world_ready(&self) -> bool;

    /// The player is in the world with no menu or event in the way
    fn is_player_free(&self) -> bool;

    /// The host's own options page, while it is the open root menu
    fn options_page(&self) -> Option<MenuId> {
        None
    }

    fn viewport(&self) -> Rect;
}

/// Chain length guard against hosts with cyclic child links
const MAX_MENU_DEPTH: usize = 64;

/// Follow child links from the active menu to the innermost one
pub fn deepest_menu(host: &dyn HostMenuStack) -> Option<MenuId> {
    let mut menu = host.active_menu()?;
    for _ in 0..MAX_MENU_DEPTH {
        match host.child_menu(menu) {
            Some(child) => menu = child,
            None => break,
        }
    }
    Some(menu)
}

/// Every menu currently reachable from the slot in use, outermost first
pub fn visible_menus(host: &dyn HostMenuStack) -> Vec<MenuId> {
    if host.is_title_screen() {
        return host.title_submenu().into_iter().collect();
    }
    let mut chain = Vec::new();
    let mut cursor = host.active_menu();
    while let Some(menu) = cursor {
        if chain.contains(&menu) || chain.len() >= MAX_MENU_DEPTH {
            break;
        }
        chain.push(menu);
        cursor = host.child_menu(menu);
    }
    chain
}

/// The menu that receives input and is drawn on top
pub fn active_config_menu(host: &dyn HostMenuStack) -> Option<MenuId> {
    if host.is_title_screen() {
        host.title_submenu()
    } else {
        deepest_menu(host)
    }
}

/// Show `menu` on top of whatever is open, or close the topmost menu.
///
/// On the title screen this replaces the submenu slot. Elsewhere a new menu
/// becomes the child of the deepest open menu, and closing detaches the
/// deepest menu so its parent shows again.
pub fn set_active_config_menu(host: &mut dyn HostMenuStack, menu: Option<MenuId>) {
    if host.is_title_screen() {
        host.set_title_submenu(menu);
        return;
    }

    let deepest = deepest_menu(host);
    match (menu, deepest) {
        (Some(menu), Some(deepest)) if deepest != menu => host.set_child_menu(deepest, Some(menu)),
        (Some(_), Some(_)) => {}
        (Some(menu), None) => host.set_active_menu(Some(menu)),
        (None, Some(deepest)) => match host.parent_menu(deepest) {
            Some(parent) => host.set_child_menu(parent, None),
            None => host.set_active_menu(None),
        },
        (None, None) => {}
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Links {
    parent: Option<MenuId>,
    child: Option<MenuId>,
}

/// Host menu stack kept entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryMenuStack {
    active: Option<MenuId>,
    title_submenu: Option<MenuId>,
    /// Only menus still attached somewhere have an entry
    links: HashMap<MenuId, Links>,
    next_id: u64,
    options_page: Option<MenuId>,
    pub title_screen: bool,
    pub world_ready: bool,
    pub player_free: bool,
    pub viewport: Rect,
}

impl InMemoryMenuStack {
    /// In a loaded session, nothing open
    pub fn in_session(viewport: Rect) -> Self {
        Self {
            active: None,
            title_submenu: None,
            links: HashMap::new(),
            next_id: 1,
            options_page: None,
            title_screen: false,
            world_ready: true,
            player_free: true,
            viewport,
        }
    }

    /// On the title screen, no save loaded
    pub fn on_title_screen(viewport: Rect) -> Self {
        Self {
            title_screen: true,
            world_ready: false,
            player_free: false,
            ..Self::in_session(viewport)
        }
    }

    /// Register a menu belonging to the host itself (e.g. the game menu)
    pub fn open_host_menu(&mut self) -> MenuId {
        let menu = self.create_menu();
        self.set_active_menu(Some(menu));
        menu
    }

    /// Open the host's game menu on its options tab
    pub fn open_options_page(&mut self) -> MenuId {
        let page = self.open_host_menu();
        self.options_page = Some(page);
        page
    }

    /// Menus the stack still keeps links for
    pub fn tracked_menus(&self) -> usize {
        self.links.len()
    }

    /// Leave the title screen for a loaded session
    pub fn load_world(&mut self) {
        self.title_screen = false;
        self.title_submenu = None;
        self.world_ready = true;
        self.player_free = true;
    }

    fn links_mut(&mut self, menu: MenuId) -> &mut Links {
        self.links.entry(menu).or_default()
    }

    /// Drop `menu` and the menus chained below it, stopping at `keep`
    fn forget(&mut self, menu: MenuId, keep: Option<MenuId>) {
        let mut cursor = Some(menu);
        while let Some(menu) = cursor.filter(|m| Some(*m) != keep) {
            cursor = self.links.remove(&menu).and_then(|l| l.child);
        }
    }
}

impl HostMenuStack for InMemoryMenuStack {
    fn create_menu(&mut self) -> MenuId {
        let menu = MenuId(self.next_id);
        self.next_id += 1;
        menu
    }

    fn active_menu(&self) -> Option<MenuId> {
        self.active
    }

    fn set_active_menu(&mut self, menu: Option<MenuId>) {
        if let Some(old) = self.active.filter(|old| Some(*old) != menu) {
            self.forget(old, menu);
        }
        if let Some(menu) = menu {
            self.links_mut(menu).parent = None;
        }
        self.active = menu;
    }

    fn child_menu(&self, menu: MenuId) -> Option<MenuId> {
        self.links.get(&menu).and_then(|l| l.child)
    }

    fn set_child_menu(&mut self, menu: MenuId, child: Option<MenuId>) {
        if let Some(old) = self.child_menu(menu).filter(|old| Some(*old) != child) {
            self.forget(old, child);
        }
        self.links_mut(menu).child = child;
        if let Some(child) = child {
            self.links_mut(child).parent = Some(menu);
        }
    }

    fn parent_menu(&self, menu: MenuId) -> Option<MenuId> {
        self.links.get(&menu).and_then(|l| l.parent)
    }

    fn is_title_screen(&self) -> bool {
        self.title_screen
    }

    fn title_submenu(&self) -> Option<MenuId> {
        self.title_submenu
    }

    fn set_title_submenu(&mut self, menu: Option<MenuId>) {
        if let Some(old) = self.title_submenu.filter(|old| Some(*old) != menu) {
            self.forget(old, menu);
        }
        self.title_submenu = menu;
    }

    fn is_world_ready(&self) -> bool {
        self.world_ready
    }

    fn is_player_free(&self) -> bool {
        self.player_free && self.active.is_none()
    }

    fn options_page(&self) -> Option<MenuId> {
        self.options_page.filter(|page| self.active == Some(*page))
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }
}
