//! Virtual image path resolution.
//!
//! Markup refers to images by virtual paths (`/images/ui/panel`). This
//! module maps those onto the filesystem: the data root is probed first,
//! then the data root's parent for `/modules/...` paths (module trees sit
//! beside the data directory). Basenames without an extension try a fixed
//! list of image extensions. No pixels are decoded here.

use std::path::{Path, PathBuf};

const FALLBACK_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".bmp", ".dds"];

/// Canonical virtual form: forward slashes, trimmed, leading `/`. Empty
/// input stays empty.
pub fn normalize_source(source: &str) -> String {
    let trimmed = source.trim().replace('\\', "/");
    if trimmed.is_empty() {
        return trimmed;
    }
    if trimmed.starts_with('/') {
        trimmed
    } else {
        format!("/{trimmed}")
    }
}

fn needs_extension_guess(normalized: &str) -> bool {
    let basename = normalized.rsplit('/').next().unwrap_or(normalized);
    !basename.contains('.')
}

/// Resolve a normalized virtual path to an existing file, if any.
pub fn resolve_image_path(normalized: &str, data_root: Option<&Path>) -> Option<PathBuf> {
    if normalized.is_empty() {
        return None;
    }
    let data_root = data_root?;

    let mut roots: Vec<&Path> = vec![data_root];
    if normalized.starts_with("/modules/") {
        if let Some(parent) = data_root.parent() {
            roots.push(parent);
        }
    }

    let guess = needs_extension_guess(normalized);
    let relative = normalized.trim_start_matches('/');
    for root in roots {
        let base = root.join(relative);
        if base.is_file() {
            return Some(base);
        }
        if !guess {
            continue;
        }
        for ext in FALLBACK_EXTENSIONS {
            let mut candidate = base.clone().into_os_string();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn normalization() {
        assert_eq!(normalize_source(" images\\ui\\panel.png "), "/images/ui/panel.png");
        assert_eq!(normalize_source("/images/a.png"), "/images/a.png");
        assert_eq!(normalize_source("  "), "");
    }

    #[test]
    fn resolves_with_extension_guess() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("panel.png"), b"x").unwrap();

        let exact = resolve_image_path("/images/panel.png", Some(dir.path()));
        assert_eq!(exact, Some(images.join("panel.png")));

        let guessed = resolve_image_path("/images/panel", Some(dir.path()));
        assert_eq!(guessed, Some(images.join("panel.png")));

        assert_eq!(resolve_image_path("/images/missing", Some(dir.path())), None);
        assert_eq!(resolve_image_path("/images/panel", None), None);
    }

    #[test]
    fn modules_paths_probe_parent_root() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let modules = dir.path().join("modules").join("game");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("icon.png"), b"x").unwrap();

        let found = resolve_image_path("/modules/game/icon.png", Some(&data));
        assert_eq!(found, Some(modules.join("icon.png")));
    }
}
