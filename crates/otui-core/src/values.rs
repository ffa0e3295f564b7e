//! Typed value grammar for property strings.
//!
//! Built on `winnow` 0.7. Every parser here is non-fatal: a value that does
//! not match its grammar yields `None` and the caller ignores the property,
//! keeping whatever was already set.

use serde::{Deserialize, Serialize};
use winnow::ascii::{digit1, float, space1};
use winnow::combinator::{opt, separated};
use winnow::prelude::*;

// ─── Geometry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle, position + extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn is_null(&self) -> bool {
        self.width == 0 && self.height == 0 && self.x == 0 && self.y == 0
    }
}

/// Per-edge integer group, used for margins, paddings and image borders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeGroup {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl EdgeGroup {
    pub fn is_zero(&self) -> bool {
        *self == EdgeGroup::default()
    }
}

// ─── Scalar parsers ──────────────────────────────────────────────────────

fn int(input: &mut &str) -> ModalResult<i32> {
    (opt('-'), digit1).take().parse_to().parse_next(input)
}

fn int_list(input: &mut &str) -> ModalResult<Vec<i32>> {
    separated(1..=8, int, space1).parse_next(input)
}

fn real(input: &mut &str) -> ModalResult<f32> {
    float.parse_next(input)
}

pub fn parse_int(value: &str) -> Option<i32> {
    int.parse(value.trim()).ok()
}

pub fn parse_float(value: &str) -> Option<f32> {
    real.parse(value.trim()).ok()
}

/// `true`/`1` and `false`/`0`, case-insensitive. Anything else is invalid.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// `X Y`, exactly two integers.
pub fn parse_point(value: &str) -> Option<Point> {
    match int_list.parse(value.trim()).ok()?.as_slice() {
        &[x, y] => Some(Point::new(x, y)),
        _ => None,
    }
}

/// `X Y W H`, exactly four integers.
pub fn parse_rect(value: &str) -> Option<Rect> {
    match int_list.parse(value.trim()).ok()?.as_slice() {
        &[x, y, w, h] => Some(Rect::new(x, y, w, h)),
        _ => None,
    }
}

/// CSS-style edge shorthand, 1 to 4 integers:
/// 1 → all edges; 2 → top/bottom, right/left; 3 → top, right/left, bottom;
/// 4 → top, right, bottom, left.
pub fn parse_edge_group(value: &str) -> Option<EdgeGroup> {
    match int_list.parse(value.trim()).ok()?.as_slice() {
        &[all] => Some(EdgeGroup {
            top: all,
            right: all,
            bottom: all,
            left: all,
        }),
        &[tb, rl] => Some(EdgeGroup {
            top: tb,
            right: rl,
            bottom: tb,
            left: rl,
        }),
        &[t, rl, b] => Some(EdgeGroup {
            top: t,
            right: rl,
            bottom: b,
            left: rl,
        }),
        &[t, r, b, l] => Some(EdgeGroup {
            top: t,
            right: r,
            bottom: b,
            left: l,
        }),
        _ => None,
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// ARGB color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("alpha", Color::argb(0, 0, 0, 0)),
    ("transparent", Color::argb(0, 0, 0, 0)),
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("brown", Color::rgb(165, 42, 42)),
    ("pink", Color::rgb(255, 192, 203)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("darkgray", Color::rgb(169, 169, 169)),
    ("darkgrey", Color::rgb(169, 169, 169)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("lightgrey", Color::rgb(211, 211, 211)),
];

impl Color {
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    /// Parse `#RGB`, `#RRGGBB`, `#AARRGGBB`, or a named color.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            let bytes = hex.as_bytes();
            return match bytes.len() {
                3 => {
                    let r = hex_val(bytes[0])?;
                    let g = hex_val(bytes[1])?;
                    let b = hex_val(bytes[2])?;
                    Some(Self::rgb(r * 17, g * 17, b * 17))
                }
                6 => {
                    let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                    let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                    let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                    Some(Self::rgb(r, g, b))
                }
                8 => {
                    let a = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                    let r = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                    let g = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                    let b = hex_val(bytes[6])? << 4 | hex_val(bytes[7])?;
                    Some(Self::argb(a, r, g, b))
                }
                _ => None,
            };
        }
        let lower = value.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, c)| c)
    }

    /// Canonical serialized form: `#aarrggbb`.
    pub fn to_hex_argb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

// ─── Font descriptors ────────────────────────────────────────────────────

/// Hyphen-separated font shorthand: `family-NNpx-bold-italic-...`.
/// Underscores in the family segment stand for spaces. Unknown flag
/// segments are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDesc {
    pub family: String,
    pub pixel_size: i32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub monospace: bool,
    pub antialias: bool,
}

impl Default for FontDesc {
    fn default() -> Self {
        Self {
            family: "Verdana".to_owned(),
            pixel_size: 11,
            bold: false,
            italic: false,
            underline: false,
            monospace: false,
            antialias: true,
        }
    }
}

impl FontDesc {
    pub fn parse(desc: &str) -> Self {
        let mut font = Self::default();
        let mut segments = desc.trim().split('-');
        if let Some(family) = segments.next() {
            if !family.is_empty() {
                font.family = family.replace('_', " ");
            }
        }
        for seg in segments {
            let seg = seg.to_ascii_lowercase();
            if let Some(px) = seg.strip_suffix("px") {
                if let Some(size) = parse_int(px) {
                    if size > 0 {
                        font.pixel_size = size;
                    }
                }
                continue;
            }
            match seg.as_str() {
                "bold" => font.bold = true,
                "italic" => font.italic = true,
                "underline" => font.underline = true,
                "monospace" | "monospaced" => font.monospace = true,
                "monochrome" => font.antialias = false,
                // Both spellings appear in the wild.
                "antialiased" | "antialised" => font.antialias = true,
                _ => {}
            }
        }
        font
    }

    /// Deterministic text extent estimate, used by text auto-resize. No
    /// rasterizer is in scope, so advance and line height derive from the
    /// pixel size alone.
    pub fn measure(&self, text: &str, wrap_width: Option<i32>) -> Point {
        let advance = (self.pixel_size * 3 / 5 + i32::from(self.bold)).max(4);
        let line_height = self.pixel_size + 3;
        let mut width = 0i32;
        let mut lines = 0i32;
        for raw in text.split('\n') {
            let chars = raw.chars().count() as i32;
            match wrap_width {
                Some(w) if w >= advance => {
                    let per_line = (w / advance).max(1);
                    lines += ((chars + per_line - 1) / per_line).max(1);
                    width = width.max(chars.min(per_line) * advance);
                }
                _ => {
                    lines += 1;
                    width = width.max(chars * advance);
                }
            }
        }
        Point::new(width, lines.max(1) * line_height)
    }
}

// ─── Text alignment ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Alignment {
    pub const TOP_LEFT: Self = Self {
        horizontal: HAlign::Left,
        vertical: VAlign::Top,
    };
    pub const CENTER: Self = Self {
        horizontal: HAlign::Center,
        vertical: VAlign::Middle,
    };

    /// Parse a whitespace-separated token list. A token sets one axis (or
    /// both for `center`); an axis no token mentions keeps `fallback`'s
    /// value.
    pub fn parse(value: &str, fallback: Self) -> Self {
        let mut align = fallback;
        for token in value.split_whitespace() {
            match token.to_ascii_lowercase().as_str() {
                "left" => align.horizontal = HAlign::Left,
                "right" => align.horizontal = HAlign::Right,
                "top" => align.vertical = VAlign::Top,
                "bottom" => align.vertical = VAlign::Bottom,
                "horizontalcenter" | "hcenter" => align.horizontal = HAlign::Center,
                "verticalcenter" | "vcenter" | "middle" => align.vertical = VAlign::Middle,
                "center" => align = Self::CENTER,
                _ => {}
            }
        }
        align
    }
}

// ─── Anchor descriptors ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorEdge {
    Left,
    Right,
    Top,
    Bottom,
    HorizontalCenter,
    VerticalCenter,
}

impl AnchorEdge {
    pub const ALL: [AnchorEdge; 6] = [
        AnchorEdge::Left,
        AnchorEdge::Right,
        AnchorEdge::Top,
        AnchorEdge::Bottom,
        AnchorEdge::HorizontalCenter,
        AnchorEdge::VerticalCenter,
    ];

    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "left" => Some(AnchorEdge::Left),
            "right" => Some(AnchorEdge::Right),
            "top" => Some(AnchorEdge::Top),
            "bottom" => Some(AnchorEdge::Bottom),
            "horizontalcenter" | "hcenter" | "centerx" => Some(AnchorEdge::HorizontalCenter),
            "verticalcenter" | "vcenter" | "centery" => Some(AnchorEdge::VerticalCenter),
            _ => None,
        }
    }

    /// Canonical form used in markup (`anchors.<edge>` keys and targets).
    pub fn name(&self) -> &'static str {
        match self {
            AnchorEdge::Left => "left",
            AnchorEdge::Right => "right",
            AnchorEdge::Top => "top",
            AnchorEdge::Bottom => "bottom",
            AnchorEdge::HorizontalCenter => "horizontalCenter",
            AnchorEdge::VerticalCenter => "verticalCenter",
        }
    }
}

/// `target.edge`, e.g. `parent.left` or `okButton.horizontalCenter`.
pub fn parse_anchor_descriptor(value: &str) -> Option<(String, AnchorEdge)> {
    let (target, edge) = value.trim().rsplit_once('.')?;
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    Some((target.to_owned(), AnchorEdge::parse(edge)?))
}
