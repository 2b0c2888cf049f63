//! Everything one owner registered: pages, callbacks and flags

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::manager::RegistrationError;
use super::option::{LazyText, OptionDescriptor, OptionKind, OptionValue};
use super::page::{ConfigPage, PageEntry, PageId};

/// Unique key of a registering owner (a mod id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity and display name of an owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerInfo {
    pub id: OwnerId,
    pub name: String,
}

impl OwnerInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(id),
            name: name.into(),
        }
    }
}

pub type OwnerCallback = Rc<dyn Fn()>;
/// Called with the field id and pending value whenever the user edits a widget
pub type FieldChanged = Rc<dyn Fn(&str, &OptionValue)>;

pub struct ModConfig {
    pub owner: OwnerInfo,
    /// Root page first, then pages in creation order
    pages: Vec<ConfigPage>,
    reset: OwnerCallback,
    save: OwnerCallback,
    title_screen_only: bool,
    title_screen_only_for_next: bool,
    keybinds_editable: bool,
    /// Where entries go when no page is named
    current_page: PageId,
    field_changed: Vec<FieldChanged>,
}

impl fmt::Debug for ModConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModConfig")
            .field("owner", &self.owner)
            .field("pages", &self.pages.len())
            .field("title_screen_only", &self.title_screen_only)
            .field("keybinds_editable", &self.keybinds_editable)
            .finish()
    }
}

fn run_callback(callback: &OwnerCallback) -> anyhow::Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| callback()))
        .map_err(|_| anyhow::anyhow!("owner callback panicked"))
}

impl ModConfig {
    pub fn new(
        owner: OwnerInfo,
        reset: impl Fn() + 'static,
        save: impl Fn() + 'static,
        title_screen_only: bool,
    ) -> Self {
        let root = ConfigPage::new(PageId::root(), owner.name.clone(), None);
        Self {
            owner,
            pages: vec![root],
            reset: Rc::new(reset),
            save: Rc::new(save),
            title_screen_only,
            title_screen_only_for_next: false,
            keybinds_editable: false,
            current_page: PageId::root(),
            field_changed: Vec::new(),
        }
    }

    pub fn id(&self) -> &OwnerId {
        &self.owner.id
    }

    /// Whole menu is only editable from the title screen
    pub fn is_title_screen_only(&self) -> bool {
        self.title_screen_only
    }

    /// Registered at least one keybind option
    pub fn keybinds_editable(&self) -> bool {
        self.keybinds_editable
    }

    pub fn root(&self) -> &ConfigPage {
        &self.pages[0]
    }

    pub fn pages(&self) -> &[ConfigPage] {
        &self.pages
    }

    pub fn page(&self, id: &PageId) -> Option<&ConfigPage> {
        self.pages.iter().find(|p| &p.id == id)
    }

    fn page_index(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| &p.id == id)
    }

    /// Index of `id`, creating it under the root page the first time it is seen
    fn ensure_page(&mut self, id: &PageId) -> usize {
        if let Some(index) = self.page_index(id) {
            return index;
        }
        tracing::debug!(owner = %self.owner.id, page = %id, "auto-creating page");
        self.pages
            .push(ConfigPage::new(id.clone(), id.as_str(), Some(PageId::root())));
        self.pages[0].children.push(id.clone());
        self.pages.len() - 1
    }

    /// Create a page under root (or rename it if it exists) and make it the
    /// target for entries added without a page
    pub fn add_page(&mut self, id: PageId, display_name: impl Into<LazyText>) {
        let index = self.ensure_page(&id);
        self.pages[index].display_name = display_name.into();
        self.current_page = id;
    }

    /// Create a page under an existing parent page
    pub fn add_subpage(
        &mut self,
        parent: PageId,
        id: PageId,
        display_name: impl Into<LazyText>,
    ) -> Result<(), RegistrationError> {
        if self.page_index(&parent).is_none() {
            return Err(RegistrationError::UnknownPage {
                owner: self.owner.id.clone(),
                page: parent,
            });
        }
        if id.is_root() || self.ancestors(&parent).contains(&id) {
            return Err(RegistrationError::PageCycle {
                owner: self.owner.id.clone(),
                page: id,
            });
        }

        match self.page_index(&id) {
            Some(index) => self.pages[index].display_name = display_name.into(),
            None => {
                self.pages
                    .push(ConfigPage::new(id.clone(), display_name, Some(parent.clone())));
                if let Some(parent_index) = self.page_index(&parent) {
                    self.pages[parent_index].children.push(id.clone());
                }
            }
        }
        self.current_page = id;
        Ok(())
    }

    /// `id` and every page above it, nearest first
    pub fn ancestors(&self, id: &PageId) -> Vec<PageId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id.clone());
        while let Some(current) = cursor {
            if chain.contains(&current) {
                break;
            }
            cursor = self.page(&current).and_then(|p| p.parent.clone());
            chain.push(current);
        }
        chain
    }

    /// Pages from root down to `id`, for breadcrumbs
    pub fn path_to(&self, id: &PageId) -> Vec<PageId> {
        let mut path = self.ancestors(id);
        path.reverse();
        path
    }

    fn push_entry(&mut self, page: Option<PageId>, entry: PageEntry) {
        let page = page.unwrap_or_else(|| self.current_page.clone());
        let index = self.ensure_page(&page);
        self.pages[index].entries.push(entry);
    }

    pub fn add_option(&mut self, page: Option<PageId>, descriptor: OptionDescriptor) -> Rc<OptionDescriptor> {
        let descriptor = if self.title_screen_only_for_next {
            descriptor.title_screen_only(true)
        } else {
            descriptor
        };
        if descriptor.kind() == OptionKind::Keybinds {
            self.keybinds_editable = true;
        }
        let descriptor = Rc::new(descriptor);
        self.push_entry(page, PageEntry::Option(descriptor.clone()));
        descriptor
    }

    pub fn add_section_title(
        &mut self,
        page: Option<PageId>,
        text: impl Into<LazyText>,
        tooltip: Option<LazyText>,
    ) {
        self.push_entry(
            page,
            PageEntry::SectionTitle {
                text: text.into(),
                tooltip,
            },
        );
    }

    pub fn add_paragraph(&mut self, page: Option<PageId>, text: impl Into<LazyText>) {
        self.push_entry(page, PageEntry::Paragraph(text.into()));
    }

    pub fn add_page_link(
        &mut self,
        page: Option<PageId>,
        target: PageId,
        text: impl Into<LazyText>,
        tooltip: Option<LazyText>,
    ) {
        self.ensure_page(&target);
        self.push_entry(
            page,
            PageEntry::PageLink {
                target,
                text: text.into(),
                tooltip,
            },
        );
    }

    /// Options added from now on are editable only on the title screen
    pub fn set_title_screen_only_for_next_options(&mut self, only: bool) {
        self.title_screen_only_for_next = only;
    }

    pub fn on_field_changed(&mut self, hook: impl Fn(&str, &OptionValue) + 'static) {
        self.field_changed.push(Rc::new(hook));
    }

    pub fn notify_field_changed(&self, field_id: &str, value: &OptionValue) {
        self.hooks().notify_field_changed(field_id, value);
    }

    /// Every option on every page, in page order
    pub fn all_options(&self) -> impl Iterator<Item = &Rc<OptionDescriptor>> {
        self.pages.iter().flat_map(ConfigPage::options)
    }

    pub fn find_option(&self, field_id: &str) -> Option<&Rc<OptionDescriptor>> {
        self.all_options()
            .find(|o| o.field_id.as_deref() == Some(field_id))
    }

    /// Clone out every owner callback. The clones can run after the registry
    /// borrow is released, so they may call back into the registry.
    pub fn hooks(&self) -> OwnerHooks {
        let widgets = || self.all_options().filter_map(|o| o.custom_widget());
        OwnerHooks {
            owner: self.owner.id.clone(),
            reset: self.reset.clone(),
            save: self.save.clone(),
            before_save: widgets().filter_map(|w| w.before_save.clone()).collect(),
            after_reset: widgets().filter_map(|w| w.after_reset.clone()).collect(),
            field_changed: self.field_changed.clone(),
        }
    }

    pub fn reset(&self) -> anyhow::Result<()> {
        self.hooks().reset()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.hooks().save()
    }
}

/// Owned copy of one owner's callbacks
#[derive(Clone)]
pub struct OwnerHooks {
    owner: OwnerId,
    reset: OwnerCallback,
    save: OwnerCallback,
    before_save: Vec<OwnerCallback>,
    after_reset: Vec<OwnerCallback>,
    field_changed: Vec<FieldChanged>,
}

impl fmt::Debug for OwnerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerHooks")
            .field("owner", &self.owner)
            .field("before_save", &self.before_save.len())
            .field("after_reset", &self.after_reset.len())
            .field("field_changed", &self.field_changed.len())
            .finish()
    }
}

impl OwnerHooks {
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Owner reset callback, then every custom widget's after-reset hook
    pub fn reset(&self) -> anyhow::Result<()> {
        run_callback(&self.reset)?;
        for after in &self.after_reset {
            run_callback(after)?;
        }
        Ok(())
    }

    /// Every custom widget's before-save hook, then the owner save callback
    pub fn save(&self) -> anyhow::Result<()> {
        for before in &self.before_save {
            run_callback(before)?;
        }
        run_callback(&self.save)
    }

    pub fn notify_field_changed(&self, field_id: &str, value: &OptionValue) {
        for hook in &self.field_changed {
            if panic::catch_unwind(AssertUnwindSafe(|| hook(field_id, value))).is_err() {
                tracing::warn!(owner = %self.owner, field_id, "field-changed hook panicked");
            }
        }
    }
}
