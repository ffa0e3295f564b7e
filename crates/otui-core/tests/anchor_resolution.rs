//! Anchor solving over a full document: fill, prev chains, and the
//! instantiation entry point.

use otui_core::{instantiate_style_source, parse_source, AnchorEdge, Rect};
use pretty_assertions::assert_eq;

const SPELL_BAR: &str = include_str!("fixtures/spell_bar.otui");

#[test]
fn fill_and_prev_chains_solve_in_document_order() {
    let widgets = parse_source(SPELL_BAR, None).unwrap();
    let ids: Vec<&str> = widgets.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["bar", "backdrop", "slot1", "slot2", "slot3"]);

    let backdrop = &widgets[1];
    assert_eq!(backdrop.rect, Rect::new(0, 0, 300, 60));
    assert!(backdrop.phantom);
    assert_eq!(backdrop.fill_target(), Some("parent"));

    assert_eq!(widgets[2].rect, Rect::new(10, 10, 40, 40));
    // Each slot hangs 5px off the previous one's right edge.
    assert_eq!(widgets[3].rect, Rect::new(55, 10, 40, 40));
    assert_eq!(widgets[4].rect, Rect::new(100, 10, 40, 40));
}

#[test]
fn anchor_to_widget_in_sibling_subtree() {
    let text = "MainWindow\n  size: 200 100\n  Panel\n    id: left\n    position: 20 0\n    size: 100 50\n    Button\n      id: ok\n      position: 30 5\n      size: 40 20\n  Label\n    id: lbl\n    size: 10 10\n    anchors.left: ok.right\n";
    let widgets = parse_source(text, None).unwrap();
    let lbl = widgets.iter().find(|w| w.id == "lbl").unwrap();
    // ok's absolute right edge: 20 + 30 + 40.
    assert_eq!(lbl.rect.x, 90);
}

#[test]
fn unresolvable_and_none_anchors() {
    let text = "MainWindow\n  size: 100 100\n  Button\n    position: 7 8\n    anchors.left: ghost.right\n    anchors.top: parent.top\n    anchors.bottom: none\n";
    let widgets = parse_source(text, None).unwrap();
    let button = &widgets[1];
    // The ghost target leaves x alone; the parent top still applies.
    assert_eq!(button.rect.x, 7);
    assert_eq!(button.rect.y, 0);
    assert!(button.anchor(AnchorEdge::Bottom).is_none());
}

#[test]
fn instantiated_style_solves_its_subtree() {
    let text = "StatusBar < Panel\n  size: 120 30\n  Label\n    id: caption\n    size: 20 10\n    anchors.centerIn: parent\n";
    let widgets = instantiate_style_source(text, "StatusBar", None).unwrap();
    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[1].rect, Rect::new(50, 10, 20, 10));
}
