//! Inheritance and template resolution over a parsed node tree.
//!
//! Resolution bakes inherited properties into the nodes themselves, so the
//! widget builder only ever reads a node's own property list. "Derived
//! wins" everywhere: a fill step never touches a key the node already has.
//!
//! Fill order per node:
//! 1. explicit `Name < Base` chain (same file first, then the style cache),
//! 2. the local unnamed template matching the node's name,
//! 3. a style-cache entry matching the node's own name.

use crate::model::{NodeIndex, NodeTree, Property};
use crate::styles::StyleCache;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Per-document resolution state, built once before the resolution pass
/// and threaded explicitly through it.
pub struct ResolutionContext<'a> {
    style_cache: Option<&'a StyleCache>,
    /// instance node → local template node (same tree).
    templates: HashMap<NodeIndex, NodeIndex>,
    template_roots: HashSet<NodeIndex>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(tree: &NodeTree, style_cache: Option<&'a StyleCache>) -> Self {
        // A local template is a root-level node with a base style and no
        // explicit id; first definition per name wins.
        let mut template_by_name: HashMap<&str, NodeIndex> = HashMap::new();
        let mut template_roots = HashSet::new();
        for &child in tree.children(tree.root()) {
            let node = tree.node(child);
            if node.base_style.is_some() && !node.has_prop("id") && !node.name.trim().is_empty() {
                template_by_name.entry(node.name.as_str()).or_insert(child);
                template_roots.insert(child);
            }
        }

        // Instances: same-named nodes anywhere in the file without their
        // own base style. A template never binds to itself.
        let mut templates = HashMap::new();
        for idx in tree.preorder() {
            let node = tree.node(idx);
            if node.base_style.is_none() {
                if let Some(&template) = template_by_name.get(node.name.as_str()) {
                    if template != idx {
                        templates.insert(idx, template);
                    }
                }
            }
        }

        Self {
            style_cache,
            templates,
            template_roots,
        }
    }

    pub fn style_cache(&self) -> Option<&'a StyleCache> {
        self.style_cache
    }

    pub fn template_for(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.templates.get(&idx).copied()
    }

    /// Template definitions are skipped when building a document's widget
    /// list (they only exist to be instantiated).
    pub fn is_template_root(&self, idx: NodeIndex) -> bool {
        self.template_roots.contains(&idx)
    }
}

/// Full property set of a base chain starting at `name`. The search prefers
/// a same-file node (never `exclude`, the deriving node itself), then the
/// style cache; a chain that terminates on a same-file node still picks up
/// the cached style of that terminal name underneath it. `visited` guards
/// against cycles by base name.
fn base_chain_props(
    tree: &NodeTree,
    ctx: &ResolutionContext,
    name: &str,
    exclude: Option<NodeIndex>,
    visited: &mut HashSet<String>,
) -> Vec<Property> {
    if !visited.insert(name.to_owned()) {
        warn!("inheritance cycle through base style '{name}'");
        return Vec::new();
    }

    if let Some(base_idx) = tree.find_named(name, exclude) {
        let node = tree.node(base_idx);
        let mut props = node.props.clone();
        let inherited = match node.base_style.clone() {
            Some(next) => base_chain_props(tree, ctx, &next, exclude, visited),
            None => cached_style_props(tree, ctx, name, exclude, visited).unwrap_or_default(),
        };
        append_missing(&mut props, inherited);
        return props;
    }

    if let Some(props) = cached_style_props(tree, ctx, name, exclude, visited) {
        return props;
    }

    debug!("unresolved base style '{name}'");
    Vec::new()
}

/// Cache half of the chain walk. Cache trees resolved their same-file
/// bases at load time; cross-file chains continue from here.
fn cached_style_props(
    tree: &NodeTree,
    ctx: &ResolutionContext,
    name: &str,
    exclude: Option<NodeIndex>,
    visited: &mut HashSet<String>,
) -> Option<Vec<Property>> {
    let (cache_tree, cache_idx) = ctx.style_cache?.find(name)?;
    let node = cache_tree.node(cache_idx);
    let mut props = node.props.clone();
    if let Some(next) = node.base_style.clone() {
        append_missing(&mut props, base_chain_props(tree, ctx, &next, exclude, visited));
    }
    Some(props)
}

fn append_missing(props: &mut Vec<Property>, extra: Vec<Property>) {
    for p in extra {
        if !props.iter().any(|q| q.key == p.key) {
            props.push(p);
        }
    }
}

fn fill_missing(tree: &mut NodeTree, idx: NodeIndex, props: Vec<Property>) {
    let node = tree.node_mut(idx);
    for p in props {
        if !node.has_prop(&p.key) {
            node.props.push(p);
        }
    }
}

/// Bake inherited properties into every node of the tree.
pub fn resolve_inheritance(tree: &mut NodeTree, ctx: &ResolutionContext) {
    // Explicit bases. Collected first, applied after, so lookups see the
    // tree as parsed rather than half-resolved.
    let mut additions: Vec<(NodeIndex, Vec<Property>)> = Vec::new();
    for idx in tree.preorder() {
        let node = tree.node(idx);
        let Some(base) = node.base_style.clone() else {
            continue;
        };
        let mut visited = HashSet::new();
        visited.insert(node.name.clone());
        let props = base_chain_props(tree, ctx, &base, Some(idx), &mut visited);
        if !props.is_empty() {
            additions.push((idx, props));
        }
    }
    for (idx, props) in additions {
        fill_missing(tree, idx, props);
    }

    // Local templates: instances take what the (now resolved) template has.
    let mut template_fills: Vec<(NodeIndex, Vec<Property>)> = Vec::new();
    for idx in tree.preorder() {
        if let Some(template) = ctx.template_for(idx) {
            template_fills.push((idx, tree.node(template).props.clone()));
        }
    }
    for (idx, props) in template_fills {
        fill_missing(tree, idx, props);
    }

    // Style definitions double as widget defaults: a node with no explicit
    // base whose own name exists in the cache takes the remaining
    // properties from there. A node with a base never gets this lookup,
    // its chain already covered the cache.
    if let Some(cache) = ctx.style_cache {
        let mut cache_fills: Vec<(NodeIndex, Vec<Property>)> = Vec::new();
        for idx in tree.preorder() {
            let node = tree.node(idx);
            if node.base_style.is_some() {
                continue;
            }
            if let Some((cache_tree, cache_idx)) = cache.find(node.name.trim()) {
                cache_fills.push((idx, cache_tree.node(cache_idx).props.clone()));
            }
        }
        for (idx, props) in cache_fills {
            fill_missing(tree, idx, props);
        }
    }
}
