//! Navigation state machine
//!
//! Screens are plain values. Every transition that leaves the mod list
//! carries the list's scroll row so coming back restores it exactly.

use crate::model::{OwnerId, PageId};

/// One owner's page stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub owner: OwnerId,
    /// Root page first, current page last
    pub path: Vec<PageId>,
    /// Scroll row of the list this was opened from; `None` when opened directly
    pub list_scroll_row: Option<usize>,
}

impl DetailState {
    pub fn new(owner: OwnerId, list_scroll_row: Option<usize>) -> Self {
        Self {
            owner,
            path: vec![PageId::root()],
            list_scroll_row,
        }
    }

    pub fn current_page(&self) -> &PageId {
        self.path.last().unwrap_or(&ROOT)
    }
}

static ROOT: PageId = PageId::ROOT;

/// The keybind option a capture popup is editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindTarget {
    pub owner: OwnerId,
    pub page: PageId,
    /// Entry index on that page
    pub entry: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Every registered owner
    List { scroll_row: usize },
    /// One owner's current page
    Detail(DetailState),
    /// Modal capture over the screen it was opened from
    KeybindEditor {
        parent: Box<Screen>,
        target: KeybindTarget,
    },
    /// Keybind options of every owner that has any
    Keybindings { list_scroll_row: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Open an owner's root page from the list
    SelectOwner { owner: OwnerId, list_scroll_row: usize },
    /// Open the shared keybindings page from the list
    OpenKeybindings { list_scroll_row: usize },
    /// Go to a page of the current owner. A page already in the path is
    /// returned to rather than pushed again.
    OpenPage(PageId),
    /// Pop one level
    Back,
    /// Leave the owner's pages for the list in one step
    ReturnToList,
    OpenKeybindEditor(KeybindTarget),
    /// Capture completed or was cancelled
    FinishKeybindEditor,
}

impl Screen {
    /// A detail screen opened without going through the list
    pub fn direct(owner: OwnerId) -> Self {
        Screen::Detail(DetailState::new(owner, None))
    }

    /// Next screen, or `None` when the transition closes the menu.
    /// Transitions that make no sense for the current screen leave it unchanged.
    pub fn apply(self, transition: Transition) -> Option<Screen> {
        match (self, transition) {
            (Screen::List { .. }, Transition::SelectOwner { owner, list_scroll_row }) => Some(
                Screen::Detail(DetailState::new(owner, Some(list_scroll_row))),
            ),
            (Screen::List { .. }, Transition::OpenKeybindings { list_scroll_row }) => {
                Some(Screen::Keybindings { list_scroll_row })
            }
            (Screen::List { .. }, Transition::Back | Transition::ReturnToList) => None,

            (Screen::Detail(mut detail), Transition::OpenPage(page)) => {
                match detail.path.iter().position(|p| *p == page) {
                    Some(index) => detail.path.truncate(index + 1),
                    None => detail.path.push(page),
                }
                Some(Screen::Detail(detail))
            }
            (Screen::Detail(mut detail), Transition::Back) if detail.path.len() > 1 => {
                detail.path.pop();
                Some(Screen::Detail(detail))
            }
            (Screen::Detail(detail), Transition::Back | Transition::ReturnToList) => detail
                .list_scroll_row
                .map(|scroll_row| Screen::List { scroll_row }),

            (Screen::Keybindings { list_scroll_row }, Transition::Back | Transition::ReturnToList) => {
                Some(Screen::List {
                    scroll_row: list_scroll_row,
                })
            }

            (parent @ (Screen::Detail(_) | Screen::Keybindings { .. }), Transition::OpenKeybindEditor(target)) => {
                Some(Screen::KeybindEditor {
                    parent: Box::new(parent),
                    target,
                })
            }
            (Screen::KeybindEditor { parent, .. }, Transition::FinishKeybindEditor | Transition::Back) => {
                Some(*parent)
            }

            (screen, transition) => {
                tracing::debug!(?screen, ?transition, "ignoring transition");
                Some(screen)
            }
        }
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        match self {
            Screen::Detail(detail) => Some(&detail.owner),
            Screen::KeybindEditor { parent, .. } => parent.owner(),
            _ => None,
        }
    }
}
