//! Public entry points: the full pipeline wired together.
//!
//! Parse → resolve inheritance → build widgets → solve anchors. The
//! `_source` variants take markup text directly and exist mostly for
//! embedding and tests; the file variants add IO and the shared style
//! cache keyed on `data_root`.

use crate::builder::{build_document, build_style};
use crate::error::{Error, Result};
use crate::layout::resolve_anchors;
use crate::model::NodeIndex;
use crate::parser::parse_document;
use crate::resolve::{ResolutionContext, resolve_inheritance};
use crate::styles::{StyleCache, style_cache_for};
use crate::widget::Widget;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn cache_for(data_root: Option<&Path>) -> Option<Arc<StyleCache>> {
    data_root.map(style_cache_for)
}

/// Parse markup text into a solved widget list.
pub fn parse_source(text: &str, data_root: Option<&Path>) -> Result<Vec<Widget>> {
    let cache = cache_for(data_root);
    let mut tree = parse_document(text)?;
    let ctx = ResolutionContext::new(&tree, cache.as_deref());
    resolve_inheritance(&mut tree, &ctx);
    let mut widgets = build_document(&tree, &ctx, data_root);
    resolve_anchors(&mut widgets);
    Ok(widgets)
}

/// Load a markup file into a solved widget list.
pub fn parse_file(path: &Path, data_root: Option<&Path>) -> Result<Vec<Widget>> {
    parse_source(&read_source(path)?, data_root)
}

/// Build the widgets for one named root-level style of a document. The
/// name matches case-insensitively; templates instantiate like any other
/// node here.
pub fn instantiate_style_source(
    text: &str,
    style_name: &str,
    data_root: Option<&Path>,
) -> Result<Vec<Widget>> {
    let cache = cache_for(data_root);
    let mut tree = parse_document(text)?;
    let ctx = ResolutionContext::new(&tree, cache.as_deref());
    resolve_inheritance(&mut tree, &ctx);

    let wanted = style_name.trim();
    let target: Option<NodeIndex> = tree
        .children(tree.root())
        .iter()
        .copied()
        .find(|&idx| tree.node(idx).name.trim().eq_ignore_ascii_case(wanted));
    let Some(target) = target else {
        return Err(Error::StyleNotFound(wanted.to_owned()));
    };

    let mut widgets = build_style(&tree, target, data_root);
    if widgets.is_empty() {
        return Err(Error::EmptyInstantiation(wanted.to_owned()));
    }
    resolve_anchors(&mut widgets);
    Ok(widgets)
}

pub fn instantiate_style(
    path: &Path,
    style_name: &str,
    data_root: Option<&Path>,
) -> Result<Vec<Widget>> {
    instantiate_style_source(&read_source(path)?, style_name, data_root)
}

/// Names of the root-level nodes of a document, de-duplicated and sorted
/// case-insensitively. No resolution runs; this is a cheap listing.
pub fn list_styles_source(text: &str) -> Result<Vec<String>> {
    let tree = parse_document(text)?;
    let mut names: Vec<String> = Vec::new();
    for &child in tree.children(tree.root()) {
        let name = tree.node(child).name.trim();
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name.to_owned());
        }
    }
    names.sort_by_key(|n| n.to_lowercase());
    Ok(names)
}

pub fn list_styles(path: &Path) -> Result<Vec<String>> {
    list_styles_source(&read_source(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_source_runs_the_whole_pipeline() {
        let text = "MainWindow\n  size: 100 100\n  Button\n    id: ok\n    size: 50 20\n    margin-right: 5\n    anchors.right: parent.right\n";
        let widgets = parse_source(text, None).unwrap();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[1].id, "ok");
        assert_eq!(widgets[1].rect.right(), 95);
    }

    #[test]
    fn list_styles_dedupes_and_sorts() {
        let text = "zWindow\nAlpha\nbeta\nALPHA\n";
        let names = list_styles_source(text).unwrap();
        assert_eq!(names, vec!["Alpha", "beta", "zWindow"]);
    }

    #[test]
    fn instantiate_matches_case_insensitively() {
        let text = "SpellButton < Button\n  size: 40 40\n  Icon\n    size: 8 8\n";
        let widgets = instantiate_style_source(text, "spellbutton", None).unwrap();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].rect.width, 40);
        assert_eq!(widgets[1].parent, Some(0));
    }

    #[test]
    fn instantiate_unknown_style_errors() {
        let err = instantiate_style_source("MainWindow\n", "Ghost", None).unwrap_err();
        assert!(matches!(err, Error::StyleNotFound(name) if name == "Ghost"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = parse_file(Path::new("/nonexistent/definitely.otui"), None).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
