//! Anchor constraint solver.
//!
//! Runs over the built widget list in order. The builder emits widgets in
//! preorder, so a widget's ancestors and earlier siblings are already
//! solved when its own turn comes; later widgets are seen at their
//! pre-solve geometry. Coordinates are compared in absolute space and
//! written back parent-relative.

use crate::values::{AnchorEdge, Point, Rect};
use crate::widget::Widget;
use std::collections::HashMap;

fn absolute_position(widgets: &[Widget], idx: usize) -> Point {
    let mut pos = Point::new(widgets[idx].rect.x, widgets[idx].rect.y);
    let mut parent = widgets[idx].parent;
    while let Some(p) = parent {
        pos.x += widgets[p].rect.x;
        pos.y += widgets[p].rect.y;
        parent = widgets[p].parent;
    }
    pos
}

fn edge_coordinate(widgets: &[Widget], idx: usize, edge: AnchorEdge) -> i32 {
    let abs = absolute_position(widgets, idx);
    let rect = widgets[idx].rect;
    match edge {
        AnchorEdge::Left => abs.x,
        AnchorEdge::Right => abs.x + rect.width,
        AnchorEdge::Top => abs.y,
        AnchorEdge::Bottom => abs.y + rect.height,
        AnchorEdge::HorizontalCenter => abs.x + rect.width / 2,
        AnchorEdge::VerticalCenter => abs.y + rect.height / 2,
    }
}

/// Nearest earlier widget sharing the same parent.
fn prev_sibling(widgets: &[Widget], idx: usize) -> Option<usize> {
    let parent = widgets[idx].parent;
    (0..idx).rev().find(|&j| widgets[j].parent == parent)
}

fn resolve_target(
    widgets: &[Widget],
    idx: usize,
    by_id: &HashMap<&str, usize>,
    target: &str,
) -> Option<usize> {
    if target.eq_ignore_ascii_case("parent") {
        return widgets[idx].parent;
    }
    if target.eq_ignore_ascii_case("prev") || target.eq_ignore_ascii_case("previous") {
        return prev_sibling(widgets, idx);
    }
    by_id.get(target).copied()
}

fn solve_one(widgets: &[Widget], idx: usize, by_id: &HashMap<&str, usize>) -> Rect {
    let widget = &widgets[idx];
    let parent_abs = match widget.parent {
        Some(p) => absolute_position(widgets, p),
        None => Point::default(),
    };
    let mut rect = widget.rect;

    let target_coord = |edge: AnchorEdge| -> Option<i32> {
        let binding = widget.anchor(edge)?;
        let target = resolve_target(widgets, idx, by_id, &binding.target)?;
        Some(edge_coordinate(widgets, target, binding.edge))
    };

    // Edge order is fixed: left, right, top, bottom, then centers. A
    // bound-but-unresolvable edge is a no-op.
    if let Some(coord) = target_coord(AnchorEdge::Left) {
        rect.x = coord - parent_abs.x + widget.margin.left;
    }
    if let Some(coord) = target_coord(AnchorEdge::Right) {
        let right_pos = coord - parent_abs.x - widget.margin.right;
        if widget.anchor(AnchorEdge::Left).is_some() {
            rect.width = (right_pos - rect.x).max(1);
        } else {
            rect.x = right_pos - rect.width;
        }
    }
    if let Some(coord) = target_coord(AnchorEdge::Top) {
        rect.y = coord - parent_abs.y + widget.margin.top;
    }
    if let Some(coord) = target_coord(AnchorEdge::Bottom) {
        let bottom_pos = coord - parent_abs.y - widget.margin.bottom;
        if widget.anchor(AnchorEdge::Top).is_some() {
            rect.height = (bottom_pos - rect.y).max(1);
        } else {
            rect.y = bottom_pos - rect.height;
        }
    }
    if let Some(coord) = target_coord(AnchorEdge::HorizontalCenter) {
        rect.x = (coord - parent_abs.x) - rect.width / 2;
    }
    if let Some(coord) = target_coord(AnchorEdge::VerticalCenter) {
        rect.y = (coord - parent_abs.y) - rect.height / 2;
    }

    rect
}

/// Solve every anchored widget in list order.
pub fn resolve_anchors(widgets: &mut [Widget]) {
    let by_id: HashMap<String, usize> = widgets
        .iter()
        .enumerate()
        .map(|(i, w)| (w.id.clone(), i))
        .collect();
    // Borrowed view so solve_one can read the whole list.
    let by_id_ref: HashMap<&str, usize> = by_id.iter().map(|(k, &v)| (k.as_str(), v)).collect();

    for i in 0..widgets.len() {
        if !widgets[i].has_anchors() {
            continue;
        }
        let rect = solve_one(widgets, i, &by_id_ref);
        widgets[i].rect = rect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;
    use pretty_assertions::assert_eq;

    fn window(id: &str, width: i32, height: i32) -> Widget {
        let mut w = Widget::new(id, WidgetKind::MainWindow);
        w.rect = Rect::new(0, 0, width, height);
        w
    }

    fn child(id: &str, parent: usize, rect: Rect) -> Widget {
        let mut w = Widget::new(id, WidgetKind::Button);
        w.parent = Some(parent);
        w.rect = rect;
        w
    }

    #[test]
    fn right_anchor_with_margin() {
        let mut button = child("ok", 0, Rect::new(0, 0, 50, 20));
        button.set_anchor(AnchorEdge::Right, "parent", AnchorEdge::Right);
        button.margin.right = 5;
        let mut widgets = vec![window("win", 100, 100), button];
        resolve_anchors(&mut widgets);
        let rect = widgets[1].rect;
        assert_eq!(rect.right(), 95);
        assert_eq!(rect.x, 45);
        assert_eq!(rect.width, 50);
    }

    #[test]
    fn left_and_right_bound_sets_width() {
        let mut bar = child("bar", 0, Rect::new(0, 0, 10, 10));
        bar.set_anchor(AnchorEdge::Left, "parent", AnchorEdge::Left);
        bar.set_anchor(AnchorEdge::Right, "parent", AnchorEdge::Right);
        bar.margin.left = 4;
        bar.margin.right = 6;
        let mut widgets = vec![window("win", 100, 100), bar];
        resolve_anchors(&mut widgets);
        assert_eq!(widgets[1].rect.x, 4);
        assert_eq!(widgets[1].rect.width, 90);
    }

    #[test]
    fn overconstrained_width_floors_at_one() {
        let mut bar = child("bar", 0, Rect::new(0, 0, 10, 10));
        bar.set_anchor(AnchorEdge::Left, "parent", AnchorEdge::Right);
        bar.set_anchor(AnchorEdge::Right, "parent", AnchorEdge::Left);
        let mut widgets = vec![window("win", 100, 100), bar];
        resolve_anchors(&mut widgets);
        assert_eq!(widgets[1].rect.width, 1);
    }

    #[test]
    fn center_in_parent_ignores_margins() {
        let mut box_ = child("box", 0, Rect::new(0, 0, 20, 10));
        box_.set_center_in_target("parent");
        box_.margin.left = 50;
        let mut widgets = vec![window("win", 100, 100), box_];
        resolve_anchors(&mut widgets);
        assert_eq!(widgets[1].rect, Rect::new(40, 45, 20, 10));
    }

    #[test]
    fn prev_resolves_to_earlier_sibling() {
        let first = child("first", 0, Rect::new(10, 10, 30, 20));
        let mut second = child("second", 0, Rect::new(0, 0, 30, 20));
        second.set_anchor(AnchorEdge::Left, "prev", AnchorEdge::Right);
        second.set_anchor(AnchorEdge::Top, "Prev", AnchorEdge::Top);
        let mut widgets = vec![window("win", 200, 100), first, second];
        resolve_anchors(&mut widgets);
        assert_eq!(widgets[2].rect.x, 40);
        assert_eq!(widgets[2].rect.y, 10);
    }

    #[test]
    fn id_targets_use_absolute_coordinates() {
        // Sibling subtrees: label anchors to a button nested in another panel.
        let mut panel = child("panel", 0, Rect::new(20, 0, 100, 50));
        panel.kind = WidgetKind::Widget;
        let button = child("ok", 1, Rect::new(30, 5, 40, 20));
        let mut label = child("lbl", 0, Rect::new(0, 0, 10, 10));
        label.set_anchor(AnchorEdge::Left, "ok", AnchorEdge::Right);
        let mut widgets = vec![window("win", 200, 100), panel, button, label];
        resolve_anchors(&mut widgets);
        // ok's absolute right edge is 20 + 30 + 40 = 90.
        assert_eq!(widgets[3].rect.x, 90);
    }

    #[test]
    fn unresolvable_target_is_a_no_op() {
        let mut b = child("b", 0, Rect::new(7, 8, 10, 10));
        b.set_anchor(AnchorEdge::Left, "ghost", AnchorEdge::Left);
        let mut widgets = vec![window("win", 100, 100), b];
        resolve_anchors(&mut widgets);
        assert_eq!(widgets[1].rect, Rect::new(7, 8, 10, 10));
    }

    #[test]
    fn solver_is_deterministic() {
        let build = || {
            let mut a = child("a", 0, Rect::new(0, 0, 10, 10));
            a.set_anchor(AnchorEdge::Left, "parent", AnchorEdge::HorizontalCenter);
            let mut b = child("b", 0, Rect::new(0, 0, 10, 10));
            b.set_anchor(AnchorEdge::Top, "a", AnchorEdge::Bottom);
            vec![window("win", 100, 100), a, b]
        };
        let mut first = build();
        let mut second = build();
        resolve_anchors(&mut first);
        resolve_anchors(&mut second);
        assert_eq!(first, second);
    }
}
