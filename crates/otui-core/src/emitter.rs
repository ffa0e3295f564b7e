//! Serialization of widget lists back to markup.
//!
//! Output is flat and semantic: one top-level block per widget, hierarchy
//! expressed only through anchors and ids. Re-parsing an emitted document
//! yields the same widgets, not the same file shape.

use crate::error::{Error, Result};
use crate::widget::Widget;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Trim a float for output: `1` not `1.000`, `0.35` not `0.350`.
fn format_num(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let mut s = format!("{value:.3}");
        while s.ends_with('0') {
            s.pop();
        }
        s
    }
}

fn emit_widget(out: &mut String, widget: &Widget) {
    let rect = widget.rect;
    let _ = writeln!(out, "{}", widget.id);
    let _ = writeln!(out, "  id: {}", widget.id);
    let _ = writeln!(out, "  position: {} {}", rect.x, rect.y);
    let _ = writeln!(out, "  size: {} {}", rect.width, rect.height);
    let _ = writeln!(out, "  opacity: {}", format_num(widget.opacity));
    let _ = writeln!(out, "  visible: {}", widget.visible);
    if widget.kind.supports_text() {
        if let Some(text) = widget.text.as_deref().filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "  text: {text}");
        }
    }
    if !widget.image_source.is_empty() {
        let _ = writeln!(out, "  image-source: {}", widget.image_source);
    }
    if !widget.image_clip.is_null() {
        let c = widget.image_clip;
        let _ = writeln!(out, "  image-clip: {} {} {} {}", c.x, c.y, c.width, c.height);
    }
    if !widget.image_border.is_null() {
        let b = widget.image_border;
        let _ = writeln!(out, "  image-border: {} {} {} {}", b.x, b.y, b.width, b.height);
    }

    if widget.phantom {
        let _ = writeln!(out, "  phantom: true");
    }
    if let Some(color) = widget.color {
        let _ = writeln!(out, "  color: {}", color.to_hex_argb());
    }

    for (prefix, group) in [("margin", widget.margin), ("padding", widget.padding)] {
        if group.is_zero() {
            continue;
        }
        let _ = writeln!(out, "  {prefix}-top: {}", group.top);
        let _ = writeln!(out, "  {prefix}-right: {}", group.right);
        let _ = writeln!(out, "  {prefix}-bottom: {}", group.bottom);
        let _ = writeln!(out, "  {prefix}-left: {}", group.left);
    }

    // The derived views compress to shorthand; everything else falls back
    // to individual edge lines.
    use crate::values::AnchorEdge;
    let fill = widget.fill_target();
    if let Some(target) = fill {
        let _ = writeln!(out, "  anchors.fill: {target}");
    }
    let center = widget.center_in_target();
    if let Some(target) = center {
        let _ = writeln!(out, "  anchors.centerIn: {target}");
    }
    if fill.is_none() {
        for edge in [
            AnchorEdge::Left,
            AnchorEdge::Right,
            AnchorEdge::Top,
            AnchorEdge::Bottom,
        ] {
            if let Some(descriptor) = widget.anchor_descriptor(edge) {
                let _ = writeln!(out, "  anchors.{}: {descriptor}", edge.name());
            }
        }
    }
    if center.is_none() {
        for edge in [AnchorEdge::HorizontalCenter, AnchorEdge::VerticalCenter] {
            if let Some(descriptor) = widget.anchor_descriptor(edge) {
                let _ = writeln!(out, "  anchors.{}: {descriptor}", edge.name());
            }
        }
    }

    out.push('\n');
}

/// Serialize a widget list to markup text.
pub fn emit_document(widgets: &[Widget]) -> String {
    let mut out = String::from("# OTUIEditor export\n");
    for widget in widgets {
        emit_widget(&mut out, widget);
    }
    out
}

/// Serialize and write to disk as UTF-8. An existing destination is kept
/// as `<path>.bak` before being overwritten.
pub fn save_file(path: &Path, widgets: &[Widget]) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if path.exists() {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".bak");
        fs::copy(path, &backup).map_err(write_err)?;
    }
    fs::write(path, emit_document(widgets)).map_err(write_err)
}
