//! Pages group an owner's options into a tree

use std::fmt;
use std::rc::Rc;

use super::option::{LazyText, OptionDescriptor};

/// Page identifier, unique within one owner. The root page has the empty id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PageId(String);

impl PageId {
    pub const ROOT: PageId = PageId(String::new());

    pub fn root() -> Self {
        Self::ROOT
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of a page
#[derive(Debug, Clone)]
pub enum PageEntry {
    Option(Rc<OptionDescriptor>),
    SectionTitle {
        text: LazyText,
        tooltip: Option<LazyText>,
    },
    Paragraph(LazyText),
    /// Button-like text that opens another page of the same owner
    PageLink {
        target: PageId,
        text: LazyText,
        tooltip: Option<LazyText>,
    },
}

impl PageEntry {
    pub fn option(&self) -> Option<&Rc<OptionDescriptor>> {
        match self {
            PageEntry::Option(option) => Some(option),
            _ => None,
        }
    }
}

/// A named, ordered list of entries plus child pages
#[derive(Debug, Clone)]
pub struct ConfigPage {
    pub id: PageId,
    pub display_name: LazyText,
    pub parent: Option<PageId>,
    pub entries: Vec<PageEntry>,
    pub children: Vec<PageId>,
}

impl ConfigPage {
    pub fn new(id: PageId, display_name: impl Into<LazyText>, parent: Option<PageId>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            parent,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn options(&self) -> impl Iterator<Item = &Rc<OptionDescriptor>> {
        self.entries.iter().filter_map(PageEntry::option)
    }
}
