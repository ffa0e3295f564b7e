//! The built widget: the flat, typed output of the pipeline.
//!
//! Widgets live in a `Vec<Widget>`; `parent` is an index into that list and
//! anchor bindings reference other widgets by id string. Geometry is raw
//! until the anchor solver runs.

use crate::values::{Alignment, AnchorEdge, Color, EdgeGroup, FontDesc, Point, Rect};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Case-insensitive widget classification from the node name. Unknown
/// names build as the generic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetKind {
    Widget,
    MainWindow,
    Button,
    Label,
    Image,
    Item,
    Creature,
}

impl WidgetKind {
    pub fn from_node_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "mainwindow" | "uiwindow" => WidgetKind::MainWindow,
            "button" | "uibutton" => WidgetKind::Button,
            "label" | "uilabel" => WidgetKind::Label,
            "image" | "uiimage" => WidgetKind::Image,
            "item" | "uiitem" => WidgetKind::Item,
            "creature" | "uicreature" => WidgetKind::Creature,
            _ => WidgetKind::Widget,
        }
    }

    pub fn supports_text(self) -> bool {
        matches!(self, WidgetKind::Button | WidgetKind::Label)
    }
}

/// One bound anchor edge: this widget's edge follows `target`'s `edge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorBinding {
    pub target: String,
    pub edge: AnchorEdge,
}

fn slot(edge: AnchorEdge) -> usize {
    match edge {
        AnchorEdge::Left => 0,
        AnchorEdge::Right => 1,
        AnchorEdge::Top => 2,
        AnchorEdge::Bottom => 3,
        AnchorEdge::HorizontalCenter => 4,
        AnchorEdge::VerticalCenter => 5,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub kind: WidgetKind,
    /// Index of the parent widget in the owning list, if any.
    pub parent: Option<usize>,
    /// Position is parent-relative; the solver rewrites this rect.
    pub rect: Rect,
    pub margin: EdgeGroup,
    pub padding: EdgeGroup,
    pub opacity: f32,
    pub visible: bool,
    pub phantom: bool,
    pub color: Option<Color>,
    pub font: FontDesc,
    pub text: Option<String>,
    pub text_align: Alignment,
    pub text_offset: Point,
    pub text_wrap: bool,
    pub text_auto_resize: bool,
    /// Normalized virtual path (leading `/`), empty when unset.
    pub image_source: String,
    /// Filesystem path the source resolved to, when it did.
    pub image_path: Option<PathBuf>,
    pub image_clip: Rect,
    /// Border slices stored as `(x=left, y=top, w=right, h=bottom)`.
    pub image_border: Rect,
    anchors: [Option<AnchorBinding>; 6],
}

impl Widget {
    pub fn new(id: impl Into<String>, kind: WidgetKind) -> Self {
        let (text, text_align) = match kind {
            WidgetKind::Button => (Some("Button".to_owned()), Alignment::CENTER),
            WidgetKind::Label => (Some("Label".to_owned()), Alignment::TOP_LEFT),
            _ => (None, Alignment::TOP_LEFT),
        };
        Self {
            id: id.into(),
            kind,
            parent: None,
            rect: Rect::new(0, 0, 32, 32),
            margin: EdgeGroup::default(),
            padding: EdgeGroup::default(),
            opacity: 1.0,
            visible: true,
            phantom: false,
            color: None,
            font: FontDesc::default(),
            text,
            text_align,
            text_offset: Point::default(),
            text_wrap: false,
            text_auto_resize: false,
            image_source: String::new(),
            image_path: None,
            image_clip: Rect::default(),
            image_border: Rect::default(),
            anchors: [const { None }; 6],
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Text assignment respects kind support; other kinds ignore it.
    pub fn set_text(&mut self, text: &str) {
        if self.kind.supports_text() {
            self.text = Some(text.to_owned());
        }
    }

    // ─── Anchors ─────────────────────────────────────────────────────────

    pub fn anchor(&self, edge: AnchorEdge) -> Option<&AnchorBinding> {
        self.anchors[slot(edge)].as_ref()
    }

    pub fn set_anchor(&mut self, edge: AnchorEdge, target: &str, target_edge: AnchorEdge) {
        let target = target.trim();
        if target.is_empty() {
            self.anchors[slot(edge)] = None;
        } else {
            self.anchors[slot(edge)] = Some(AnchorBinding {
                target: target.to_owned(),
                edge: target_edge,
            });
        }
    }

    pub fn clear_anchor(&mut self, edge: AnchorEdge) {
        self.anchors[slot(edge)] = None;
    }

    pub fn has_anchors(&self) -> bool {
        self.anchors.iter().any(Option::is_some)
    }

    /// `target.edge` form for one bound edge, as written in markup.
    pub fn anchor_descriptor(&self, edge: AnchorEdge) -> Option<String> {
        self.anchor(edge)
            .map(|b| format!("{}.{}", b.target, b.edge.name()))
    }

    /// The fill view: a target id when all four edge anchors point at the
    /// same target with matching edges, as `anchors.fill` would set them.
    pub fn fill_target(&self) -> Option<&str> {
        let sides = [
            AnchorEdge::Left,
            AnchorEdge::Right,
            AnchorEdge::Top,
            AnchorEdge::Bottom,
        ];
        let mut target: Option<&str> = None;
        for edge in sides {
            let binding = self.anchor(edge)?;
            if binding.edge != edge {
                return None;
            }
            match target {
                None => target = Some(&binding.target),
                Some(t) if t == binding.target => {}
                Some(_) => return None,
            }
        }
        target
    }

    /// Expand `anchors.fill`. An empty or `none` target clears every
    /// binding instead, centers included.
    pub fn set_fill_target(&mut self, target: &str) {
        let target = target.trim();
        if target.is_empty() || target.eq_ignore_ascii_case("none") {
            self.anchors = [const { None }; 6];
            return;
        }
        for edge in [
            AnchorEdge::Left,
            AnchorEdge::Right,
            AnchorEdge::Top,
            AnchorEdge::Bottom,
        ] {
            self.set_anchor(edge, target, edge);
        }
    }

    /// The centerIn view, mirroring `fill_target` for the two center edges.
    pub fn center_in_target(&self) -> Option<&str> {
        let h = self.anchor(AnchorEdge::HorizontalCenter)?;
        let v = self.anchor(AnchorEdge::VerticalCenter)?;
        if h.edge != AnchorEdge::HorizontalCenter || v.edge != AnchorEdge::VerticalCenter {
            return None;
        }
        (h.target == v.target).then_some(h.target.as_str())
    }

    pub fn set_center_in_target(&mut self, target: &str) {
        let target = target.trim();
        if target.is_empty() || target.eq_ignore_ascii_case("none") {
            self.clear_anchor(AnchorEdge::HorizontalCenter);
            self.clear_anchor(AnchorEdge::VerticalCenter);
            return;
        }
        self.set_anchor(AnchorEdge::HorizontalCenter, target, AnchorEdge::HorizontalCenter);
        self.set_anchor(AnchorEdge::VerticalCenter, target, AnchorEdge::VerticalCenter);
    }

    // ─── Text geometry ───────────────────────────────────────────────────

    /// Grow the rect to hold the current text. Auto-resize only ever
    /// enlarges; a rect already bigger than the text keeps its size.
    pub fn auto_resize_to_text(&mut self) {
        let Some(text) = self.text.as_deref() else {
            return;
        };
        let wrap = (self.text_wrap && self.rect.width > 0).then_some(self.rect.width);
        let measured = self.font.measure(text, wrap);
        self.rect.width = self.rect.width.max(measured.x + self.text_offset.x);
        self.rect.height = self.rect.height.max(measured.y + self.text_offset.y);
    }
}
