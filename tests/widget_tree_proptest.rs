// Property tests for the root container's ordering and layout

use std::cell::RefCell;
use std::rc::Rc;

use config_menu::view::controls::{Anchor, ButtonState, Element, ElementBase};
use config_menu::view::ui::RootElement;
use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use proptest::prelude::*;
use ratatui::layout::Rect;

fn click(x: u16, y: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: x,
        row: y,
        modifiers: KeyModifiers::NONE,
    })
}

/// Buttons stacked at the same spot, each recording its index when clicked
fn stacked(count: usize, clicks: &Rc<RefCell<Vec<usize>>>) -> RootElement {
    let mut root = RootElement::new(Rect::new(0, 0, 40, 10));
    for i in 0..count {
        let clicks = clicks.clone();
        root.add_child(Element::Button(ButtonState::new(format!("b{i}")).with_base(
            ElementBase::at(1, 1).with_callback(Rc::new(move |_| clicks.borrow_mut().push(i))),
        )));
    }
    root
}

fn anchored(viewport: Rect, anchors: &[(bool, u16, u16)]) -> RootElement {
    let mut root = RootElement::new(viewport);
    for (i, (right, dx, dy)) in anchors.iter().enumerate() {
        let anchor = if *right {
            Anchor::bottom_right(*dx, *dy)
        } else {
            Anchor::bottom_left(*dx, *dy)
        };
        root.add_child(Element::Button(ButtonState::new(format!("a{i}")).with_base(
            ElementBase::default().with_anchor(anchor),
        )));
    }
    root
}

fn bounds(root: &RootElement) -> Vec<Rect> {
    root.children().iter().map(|c| c.base().bounds).collect()
}

proptest! {
    #[test]
    fn prop_draw_order_is_insertion_and_hits_are_reversed(count in 0usize..12) {
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let root = stacked(count, &clicks);
        let draw = root.draw_sequence();
        let mut hits = root.hit_test_sequence();
        prop_assert_eq!(&draw, &(0..count).collect::<Vec<_>>());
        hits.reverse();
        prop_assert_eq!(hits, draw);
    }

    #[test]
    fn prop_topmost_child_takes_the_click(count in 1usize..12) {
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let mut root = stacked(count, &clicks);
        prop_assert!(root.handle_input(&click(2, 1)));
        prop_assert_eq!(clicks.borrow().clone(), vec![count - 1]);
    }

    #[test]
    fn prop_resize_is_idempotent(
        anchors in prop::collection::vec((any::<bool>(), 0u16..20, 0u16..10), 1..6),
        first in (10u16..200, 5u16..80),
        second in (10u16..200, 5u16..80),
    ) {
        let first = Rect::new(0, 0, first.0, first.1);
        let second = Rect::new(0, 0, second.0, second.1);

        let mut root = anchored(first, &anchors);
        root.resize(second);
        let once = bounds(&root);
        root.resize(second);
        prop_assert_eq!(&bounds(&root), &once);

        let fresh = anchored(second, &anchors);
        prop_assert_eq!(bounds(&fresh), once);
    }
}
