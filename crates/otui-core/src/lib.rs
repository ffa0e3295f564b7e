//! OTUI markup engine: parses the line-oriented, indentation-sensitive UI
//! description format, resolves style inheritance and local templates,
//! builds typed widgets, solves anchor constraints, and serializes widget
//! lists back to markup.

pub mod builder;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod images;
pub mod layout;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod styles;
pub mod values;
pub mod widget;

pub use emitter::{emit_document, save_file};
pub use engine::{
    instantiate_style, instantiate_style_source, list_styles, list_styles_source, parse_file,
    parse_source,
};
pub use error::{Error, Result};
pub use layout::resolve_anchors;
pub use model::{Event, Node, NodeIndex, NodeTree, Property, State};
pub use parser::parse_document;
pub use resolve::{ResolutionContext, resolve_inheritance};
pub use styles::{StyleCache, invalidate_style_cache, style_cache_for};
pub use values::{
    Alignment, AnchorEdge, Color, EdgeGroup, FontDesc, HAlign, Point, Rect, VAlign,
};
pub use widget::{AnchorBinding, Widget, WidgetKind};
