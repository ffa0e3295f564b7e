//! Shared style definitions loaded from a data directory.
//!
//! Every `*.otui` file under `<data_root>/styles/`, recursively, contributes
//! named nodes to the cache. Nodes are indexed by bare name, descendants
//! included, first occurrence wins (files in sorted path order). Same-file
//! inheritance is resolved at load time so cached nodes carry their full
//! property set.
//!
//! Caches are interned process-wide by normalized data root, so repeated
//! parses against the same root never rescan the directory.

use crate::model::{NodeIndex, NodeTree};
use crate::parser::parse_document;
use crate::resolve::{ResolutionContext, resolve_inheritance};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

pub struct StyleCache {
    root: PathBuf,
    trees: Vec<NodeTree>,
    by_name: HashMap<String, (usize, NodeIndex)>,
}

impl StyleCache {
    /// Scan and index `<data_root>/styles/**/*.otui`. Unreadable or
    /// malformed files are skipped with a warning; a missing styles
    /// directory yields an empty cache.
    pub fn load(data_root: &Path) -> Self {
        let mut cache = Self {
            root: data_root.to_path_buf(),
            trees: Vec::new(),
            by_name: HashMap::new(),
        };

        let pattern = data_root.join("styles").join("**").join("*.otui");
        let Some(pattern) = pattern.to_str() else {
            warn!("style scan skipped, non-utf8 data root: {}", data_root.display());
            return cache;
        };
        let Ok(paths) = glob::glob(pattern) else {
            return cache;
        };
        let mut files: Vec<PathBuf> = paths.flatten().collect();
        files.sort();

        for path in files {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!("skipping unreadable style file {}: {err}", path.display());
                    continue;
                }
            };
            let mut tree = match parse_document(&text) {
                Ok(tree) => tree,
                Err(err) => {
                    warn!("skipping malformed style file {}: {err}", path.display());
                    continue;
                }
            };
            // Same-file bases only; the cache is not available to itself
            // while loading.
            let ctx = ResolutionContext::new(&tree, None);
            resolve_inheritance(&mut tree, &ctx);

            let tree_idx = cache.trees.len();
            let mut indexed = 0usize;
            for idx in tree.preorder() {
                let name = tree.node(idx).name.trim();
                if name.is_empty() {
                    continue;
                }
                cache
                    .by_name
                    .entry(name.to_owned())
                    .or_insert((tree_idx, idx));
                indexed += 1;
            }
            cache.trees.push(tree);
            debug!("style cache: {} ({indexed} nodes)", path.display());
        }
        cache
    }

    pub fn find(&self, name: &str) -> Option<(&NodeTree, NodeIndex)> {
        self.by_name
            .get(name)
            .map(|&(tree, idx)| (&self.trees[tree], idx))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ─── Process-wide registry ───────────────────────────────────────────────

static REGISTRY: LazyLock<RwLock<HashMap<PathBuf, Arc<StyleCache>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn normalize_root(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Cache for a data root, loading it on first request.
pub fn style_cache_for(data_root: &Path) -> Arc<StyleCache> {
    let key = normalize_root(data_root);
    {
        let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cache) = registry.get(&key) {
            return Arc::clone(cache);
        }
    }
    let cache = Arc::new(StyleCache::load(&key));
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(registry.entry(key).or_insert(cache))
}

/// Drop the cached scan for a root, forcing a reload on next use.
pub fn invalidate_style_cache(data_root: &Path) {
    let key = normalize_root(data_root);
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&key);
}
