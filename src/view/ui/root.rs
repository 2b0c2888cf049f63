//! Root container: an ordered list of elements with one z-order
//!
//! Children are drawn in insertion order and hit-tested in reverse, so the
//! last child added is on top. At most one child is the exclusive input
//! target (an open dropdown, an editing text box, a capturing keybind popup);
//! it sees every event first.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::input::{pointer_position, FrameInput};
use crate::view::controls::{Capture, Element, InputOutcome, Notice};
use crate::view::theme::MenuTheme;

#[derive(Debug, Default)]
pub struct RootElement {
    children: Vec<Element>,
    viewport: Rect,
    /// Region (relative to the viewport) where scrolling children are shown
    body: Option<Rect>,
    scroll_row: usize,
    exclusive: Option<usize>,
    focused: Option<usize>,
    hovered: Option<usize>,
    notices: Vec<(usize, Notice)>,
}

impl RootElement {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Append a child on top of the existing ones; returns its index
    pub fn add_child(&mut self, element: Element) -> usize {
        self.children.push(element);
        let index = self.children.len() - 1;
        self.layout_child(index);
        index
    }

    pub fn child(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Indices in the order children are drawn
    pub fn draw_sequence(&self) -> Vec<usize> {
        (0..self.children.len()).collect()
    }

    /// Indices in the order children are offered pointer input
    pub fn hit_test_sequence(&self) -> Vec<usize> {
        (0..self.children.len()).rev().collect()
    }

    /// Drop children from `len` onwards
    pub fn truncate(&mut self, len: usize) {
        self.children.truncate(len);
        let keep = |slot: Option<usize>| slot.filter(|i| *i < len);
        self.exclusive = keep(self.exclusive);
        self.focused = keep(self.focused);
        self.hovered = keep(self.hovered);
        self.notices.retain(|(i, _)| *i < len);
    }

    pub fn set_body(&mut self, body: Rect) {
        self.body = Some(body);
        self.layout();
    }

    /// Recompute anchored positions and bounds for a new viewport
    pub fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.scroll_row = self.scroll_row.min(self.max_scroll_row());
        self.layout();
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    /// Furthest the body can scroll before the last row is at its bottom
    pub fn max_scroll_row(&self) -> usize {
        let Some(body) = self.body else {
            return 0;
        };
        let content_bottom = self
            .children
            .iter()
            .filter(|c| c.base().scrolls && c.base().visible)
            .map(|c| c.base().local_position.y as usize + c.size().1 as usize)
            .max()
            .unwrap_or(0);
        content_bottom.saturating_sub(body.y as usize + body.height as usize)
    }

    pub fn set_scroll_row(&mut self, row: usize) {
        let row = row.min(self.max_scroll_row());
        if row != self.scroll_row {
            self.scroll_row = row;
            self.layout();
        }
    }

    pub fn scroll_by(&mut self, rows: isize) {
        let row = self.scroll_row.saturating_add_signed(rows);
        self.set_scroll_row(row);
    }

    fn layout(&mut self) {
        for index in 0..self.children.len() {
            self.layout_child(index);
        }
    }

    fn layout_child(&mut self, index: usize) {
        let viewport = self.viewport;
        let body = self.body;
        let scroll_row = self.scroll_row;
        let Some(child) = self.children.get_mut(index) else {
            return;
        };
        let size = child.size();
        let base = child.base_mut();

        if let Some(anchor) = base.anchor {
            base.local_position = anchor.resolve(viewport, size);
        }

        let mut local_y = i64::from(base.local_position.y);
        if base.scrolls {
            local_y -= scroll_row as i64;
        }
        base.clipped = match (base.scrolls, body) {
            (true, Some(body)) => {
                local_y < i64::from(body.y)
                    || local_y + i64::from(size.1) > i64::from(body.y) + i64::from(body.height)
            }
            _ => local_y < 0,
        };

        let y = (i64::from(viewport.y) + local_y.max(0)).min(i64::from(u16::MAX)) as u16;
        let x = viewport.x.saturating_add(base.local_position.x);
        let width = size.0.min(viewport.right().saturating_sub(x));
        base.bounds = Rect::new(x, y, width, size.1);
    }

    /// Re-measure one child after its content changed size
    pub fn relayout_child(&mut self, index: usize) {
        self.layout_child(index);
    }

    /// Per-frame update: hover goes to the topmost child under the cursor
    pub fn update(&mut self, input: &FrameInput) {
        let hovered = input.cursor.and_then(|pos| match self.exclusive {
            Some(ex) => self
                .children
                .get(ex)
                .filter(|c| c.contains_pointer(pos))
                .map(|_| ex),
            None => self
                .hit_test_sequence()
                .into_iter()
                .find(|i| self.children[*i].contains_pointer(pos)),
        });
        self.hovered = hovered;

        for (index, child) in self.children.iter_mut().enumerate() {
            if let Some(notice) = child.update(input, hovered == Some(index)) {
                self.notices.push((index, notice));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, theme: &MenuTheme) {
        for child in &self.children {
            child.draw(frame, theme);
        }
        for child in &self.children {
            child.draw_overlay(frame, theme);
        }
    }

    /// Route a discrete event. Returns true if a child consumed it.
    pub fn handle_input(&mut self, event: &Event) -> bool {
        if let Some(ex) = self.exclusive {
            let outcome = self.children[ex].handle_input(event);
            self.apply(ex, outcome);
            if outcome.consumed {
                return true;
            }
        }

        match event {
            Event::Mouse(mouse) => {
                if matches!(
                    mouse.kind,
                    MouseEventKind::ScrollUp
                        | MouseEventKind::ScrollDown
                        | MouseEventKind::ScrollLeft
                        | MouseEventKind::ScrollRight
                ) {
                    return false;
                }
                let Some(pos) = pointer_position(event) else {
                    return false;
                };
                for index in self.hit_test_sequence() {
                    if !self.children[index].contains_pointer(pos) {
                        continue;
                    }
                    let outcome = self.children[index].handle_input(event);
                    self.apply(index, outcome);
                    if outcome.consumed {
                        if self.children[index].is_focusable() {
                            self.set_focus(Some(index));
                        }
                        return true;
                    }
                }
                if matches!(mouse.kind, MouseEventKind::Down(_)) {
                    self.set_focus(None);
                }
                false
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Tab => {
                    self.focus_next(true);
                    true
                }
                KeyCode::BackTab => {
                    self.focus_next(false);
                    true
                }
                _ => self.offer_focused(event),
            },
            _ => self.offer_focused(event),
        }
    }

    fn offer_focused(&mut self, event: &Event) -> bool {
        let Some(index) = self.focused else {
            return false;
        };
        let outcome = self.children[index].handle_input(event);
        self.apply(index, outcome);
        outcome.consumed
    }

    fn apply(&mut self, index: usize, outcome: InputOutcome) {
        match outcome.capture {
            Capture::Acquire => self.exclusive = Some(index),
            Capture::Release if self.exclusive == Some(index) => self.exclusive = None,
            _ => {}
        }
        if outcome.activated {
            self.notices.push((index, Notice::Changed));
        }
    }

    /// Make a child the exclusive input target (used for modal popups)
    pub fn capture(&mut self, index: usize) {
        if index < self.children.len() {
            self.exclusive = Some(index);
        }
    }

    pub fn exclusive(&self) -> Option<usize> {
        self.exclusive
    }

    /// Commit any editing text box and close any open dropdown. Returns the
    /// child whose value the commit changed.
    pub fn release_focus(&mut self) -> Option<usize> {
        let ex = self.exclusive.take()?;
        let changed = self.children.get_mut(ex)?.release();
        changed.then(|| {
            self.notices.push((ex, Notice::Changed));
            ex
        })
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn set_focus(&mut self, index: Option<usize>) {
        if let Some(old) = self.focused.and_then(|i| self.children.get_mut(i)) {
            old.base_mut().focused = false;
        }
        self.focused = index.filter(|i| *i < self.children.len());
        if let Some(i) = self.focused {
            self.children[i].base_mut().focused = true;
            self.scroll_into_view(i);
        }
    }

    fn focus_next(&mut self, forward: bool) {
        let candidates: Vec<usize> = (0..self.children.len())
            .filter(|i| {
                let child = &self.children[*i];
                child.is_focusable() && child.base().visible && child.base().enabled
            })
            .collect();
        if candidates.is_empty() {
            return;
        }
        let position = self
            .focused
            .and_then(|f| candidates.iter().position(|c| *c == f));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => candidates.len() - 1,
            (Some(p), true) => (p + 1) % candidates.len(),
            (Some(p), false) => (p + candidates.len() - 1) % candidates.len(),
        };
        self.set_focus(Some(candidates[next]));
    }

    fn scroll_into_view(&mut self, index: usize) {
        let Some(body) = self.body else {
            return;
        };
        let child = &self.children[index];
        if !child.base().scrolls {
            return;
        }
        let top = child.base().local_position.y as usize;
        let bottom = top + child.size().1 as usize;
        let body_top = body.y as usize;
        let body_bottom = body_top + body.height as usize;
        if top < self.scroll_row + body_top {
            self.set_scroll_row(top.saturating_sub(body_top));
        } else if bottom > self.scroll_row + body_bottom {
            self.set_scroll_row(bottom - body_bottom);
        }
    }

    /// Notices raised since the last call, in the order they happened
    pub fn take_notices(&mut self) -> Vec<(usize, Notice)> {
        std::mem::take(&mut self.notices)
    }

    pub fn hovered_tooltip(&self) -> Option<&str> {
        self.hovered
            .and_then(|i| self.children.get(i))
            .and_then(|c| c.base().tooltip.as_deref())
    }
}
