//! Widget construction from a resolved node tree.
//!
//! By the time the builder runs, inheritance has been baked into the nodes,
//! so every property is read straight off the node. Unparseable values are
//! validation failures: the property is ignored and the widget keeps its
//! previous (or default) value.

use crate::images::{normalize_source, resolve_image_path};
use crate::model::{Node, NodeIndex, NodeTree};
use crate::resolve::ResolutionContext;
use crate::values::{
    Alignment, AnchorEdge, Color, FontDesc, Point, Rect, parse_anchor_descriptor, parse_bool,
    parse_edge_group, parse_float, parse_int, parse_point, parse_rect,
};
use crate::widget::{Widget, WidgetKind};
use log::debug;
use std::collections::HashSet;
use std::path::Path;

/// Build the widget list for a whole document. Top-level template
/// definitions (base style, no explicit id) produce no widgets.
pub fn build_document(
    tree: &NodeTree,
    ctx: &ResolutionContext,
    data_root: Option<&Path>,
) -> Vec<Widget> {
    let mut widgets = Vec::new();
    let mut used_ids = HashSet::new();
    for &child in tree.children(tree.root()) {
        if ctx.is_template_root(child) {
            continue;
        }
        let node = tree.node(child);
        let id_less = node.prop("id").is_none_or(|id| id.trim().is_empty());
        if node.base_style.is_some() && id_less {
            debug!("skipping template definition '{}'", node.name);
            continue;
        }
        build_subtree(tree, child, None, data_root, &mut widgets, &mut used_ids);
    }
    widgets
}

/// Build one named style's subtree, template or not.
pub fn build_style(tree: &NodeTree, target: NodeIndex, data_root: Option<&Path>) -> Vec<Widget> {
    let mut widgets = Vec::new();
    let mut used_ids = HashSet::new();
    build_subtree(tree, target, None, data_root, &mut widgets, &mut used_ids);
    widgets
}

fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_owned()) {
        return base.to_owned();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn build_subtree(
    tree: &NodeTree,
    idx: NodeIndex,
    parent: Option<usize>,
    data_root: Option<&Path>,
    widgets: &mut Vec<Widget>,
    used_ids: &mut HashSet<String>,
) {
    let node = tree.node(idx);
    let name = node.name.trim();
    let raw_id = node
        .prop("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(name);
    let id = unique_id(raw_id, used_ids);

    let mut widget = Widget::new(id, WidgetKind::from_node_name(name));
    widget.parent = parent;
    let parent_rect = parent.map(|p| widgets[p].rect);
    apply_props(&mut widget, node, parent_rect, data_root);

    let my_index = widgets.len();
    widgets.push(widget);
    for &child in tree.children(idx) {
        build_subtree(tree, child, Some(my_index), data_root, widgets, used_ids);
    }
}

/// `size` keeps the widget inside its parent: right and bottom clamp to the
/// parent's extent.
fn set_size_clamped(widget: &mut Widget, size: Point, parent_rect: Option<Rect>) {
    widget.rect.width = size.x;
    widget.rect.height = size.y;
    if let Some(parent) = parent_rect {
        if widget.rect.right() > parent.width {
            widget.rect.width = (parent.width - widget.rect.x).max(0);
        }
        if widget.rect.bottom() > parent.height {
            widget.rect.height = (parent.height - widget.rect.y).max(0);
        }
    }
}

fn apply_props(
    widget: &mut Widget,
    node: &Node,
    parent_rect: Option<Rect>,
    data_root: Option<&Path>,
) {
    if let Some(v) = node.prop("font") {
        widget.font = FontDesc::parse(v);
    }
    if let Some(p) = node.prop("position").and_then(parse_point) {
        widget.rect.x = p.x;
        widget.rect.y = p.y;
    }
    if let Some(p) = node.prop("size").and_then(parse_point) {
        set_size_clamped(widget, p, parent_rect);
    }
    if let Some(o) = node.prop("opacity").and_then(parse_float) {
        widget.set_opacity(o);
    }
    if let Some(b) = node.prop("visible").and_then(parse_bool) {
        widget.visible = b;
    }
    if let Some(v) = node.prop("text") {
        if !v.is_empty() {
            widget.set_text(v);
        }
    }
    if let Some(v) = node.prop("text-align") {
        widget.text_align = Alignment::parse(v, widget.text_align);
    }
    if let Some(p) = node.prop("text-offset").and_then(parse_point) {
        widget.text_offset = p;
    }
    if let Some(b) = node.prop("text-wrap").and_then(parse_bool) {
        widget.text_wrap = b;
    }
    if let Some(b) = node.prop("text-auto-resize").and_then(parse_bool) {
        widget.text_auto_resize = b;
    }
    if widget.text_auto_resize && widget.text.as_deref().is_some_and(|t| !t.is_empty()) {
        widget.auto_resize_to_text();
    }

    if let Some(v) = node.prop("image-source") {
        let normalized = normalize_source(v);
        if !normalized.is_empty() {
            widget.image_path = resolve_image_path(&normalized, data_root);
            widget.image_source = normalized;
        }
    }
    if let Some(r) = node.prop("image-clip").and_then(parse_rect) {
        widget.image_clip = r;
    }
    if let Some(g) = node.prop("image-border").and_then(parse_edge_group) {
        widget.image_border = Rect::new(g.left, g.top, g.right, g.bottom);
    }
    if let Some(n) = node.prop("image-border-top").and_then(parse_int) {
        widget.image_border.y = n;
    }
    if let Some(n) = node.prop("image-border-right").and_then(parse_int) {
        widget.image_border.width = n;
    }
    if let Some(n) = node.prop("image-border-bottom").and_then(parse_int) {
        widget.image_border.height = n;
    }
    if let Some(n) = node.prop("image-border-left").and_then(parse_int) {
        widget.image_border.x = n;
    }

    // `x`/`y` land after `position` and override its components.
    if let Some(n) = node.prop("x").and_then(parse_int) {
        widget.rect.x = n;
    }
    if let Some(n) = node.prop("y").and_then(parse_int) {
        widget.rect.y = n;
    }

    if let Some(g) = node.prop("margin").and_then(parse_edge_group) {
        widget.margin = g;
    }
    if let Some(n) = node.prop("margin-top").and_then(parse_int) {
        widget.margin.top = n;
    }
    if let Some(n) = node.prop("margin-right").and_then(parse_int) {
        widget.margin.right = n;
    }
    if let Some(n) = node.prop("margin-bottom").and_then(parse_int) {
        widget.margin.bottom = n;
    }
    if let Some(n) = node.prop("margin-left").and_then(parse_int) {
        widget.margin.left = n;
    }
    if let Some(g) = node.prop("padding").and_then(parse_edge_group) {
        widget.padding = g;
    }
    if let Some(n) = node.prop("padding-top").and_then(parse_int) {
        widget.padding.top = n;
    }
    if let Some(n) = node.prop("padding-right").and_then(parse_int) {
        widget.padding.right = n;
    }
    if let Some(n) = node.prop("padding-bottom").and_then(parse_int) {
        widget.padding.bottom = n;
    }
    if let Some(n) = node.prop("padding-left").and_then(parse_int) {
        widget.padding.left = n;
    }

    // Fixed application order; the shorthands come last and override any
    // individual edges set above, whatever the document order was.
    for edge in AnchorEdge::ALL {
        let key = format!("anchors.{}", edge.name());
        if let Some(v) = node.prop(&key) {
            if v.trim().eq_ignore_ascii_case("none") {
                widget.clear_anchor(edge);
            } else if let Some((target, target_edge)) = parse_anchor_descriptor(v) {
                widget.set_anchor(edge, &target, target_edge);
            }
        }
    }
    if let Some(v) = node.prop("anchors.centerIn") {
        widget.set_center_in_target(v);
    }
    if let Some(v) = node.prop("anchors.fill") {
        widget.set_fill_target(v);
    }

    if let Some(b) = node.prop("phantom").and_then(parse_bool) {
        widget.phantom = b;
    }
    if let Some(c) = node.prop("color").and_then(Color::parse) {
        widget.color = Some(c);
    }
}
