//! Raw document model: the node tree produced by the parser.
//!
//! The tree is an index-based arena. `NodeIndex` handles are only valid for
//! the `NodeTree` that issued them; cross-tree references (base styles,
//! anchor targets) are always names, never indices. A synthetic root named
//! `__root__` with indent -1 owns the document's top-level nodes and is
//! never materialized as a widget.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle into a `NodeTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub(crate) usize);

/// A `key: value` line. The trailing `# comment`, if any, stays attached so
/// a later save can restore it next to the same property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
    pub comment: Option<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }
}

/// A `$condition:` block and the properties collected under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub condition: String,
    pub negated: bool,
    pub props: Vec<Property>,
}

impl State {
    /// Same overwrite-in-place rule as node properties.
    pub fn set_prop(&mut self, key: &str, value: impl Into<String>, comment: Option<String>) {
        match self.props.iter_mut().find(|p| p.key == key) {
            Some(p) => {
                p.value = value.into();
                p.comment = comment;
            }
            None => self.props.push(Property {
                key: key.to_owned(),
                value: value.into(),
                comment,
            }),
        }
    }
}

/// An `@name:` handler. The body is opaque text; `block` marks the
/// multi-line `|` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub code: String,
    pub block: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// `Base` from a `Name < Base` header.
    pub base_style: Option<String>,
    /// Source indentation depth (tab = 4 columns). -1 for the synthetic root.
    pub indent: i32,
    /// Comment-only lines that immediately preceded this node, newline-joined.
    pub comment_before: Option<String>,
    /// Trailing comment on the header line itself.
    pub comment_inline: Option<String>,
    pub props: Vec<Property>,
    pub states: SmallVec<[State; 2]>,
    pub events: SmallVec<[Event; 2]>,
    children: Vec<NodeIndex>,
    parent: Option<NodeIndex>,
}

impl Node {
    pub fn new(name: impl Into<String>, indent: i32) -> Self {
        Self {
            name: name.into(),
            base_style: None,
            indent,
            comment_before: None,
            comment_inline: None,
            props: Vec::new(),
            states: SmallVec::new(),
            events: SmallVec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn has_prop(&self, key: &str) -> bool {
        self.props.iter().any(|p| p.key == key)
    }

    /// Assign a property. Re-assigning an existing key replaces the value
    /// and comment but keeps the property's position in the list.
    pub fn set_prop(&mut self, key: &str, value: impl Into<String>, comment: Option<String>) {
        match self.props.iter_mut().find(|p| p.key == key) {
            Some(p) => {
                p.value = value.into();
                p.comment = comment;
            }
            None => self.props.push(Property {
                key: key.to_owned(),
                value: value.into(),
                comment,
            }),
        }
    }
}

// ─── Tree arena ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTree {
    nodes: Vec<Node>,
    root: NodeIndex,
}

impl NodeTree {
    pub fn new() -> Self {
        let root = Node::new("__root__", -1);
        Self {
            nodes: vec![root],
            root: NodeIndex(0),
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[idx.0]
    }

    pub fn add_child(&mut self, parent: NodeIndex, mut node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(idx);
        idx
    }

    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.nodes[idx.0].children
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.nodes[idx.0].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // Only the synthetic root.
        self.nodes.len() == 1
    }

    /// Depth-first preorder over real nodes (the synthetic root is skipped).
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.nodes.len() - 1);
        let mut stack: Vec<NodeIndex> = self.children(self.root).iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.children(idx).iter().rev().copied());
        }
        out
    }

    /// Preorder subtree rooted at `start`, including `start` itself.
    pub fn subtree(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.children(idx).iter().rev().copied());
        }
        out
    }

    /// First node (preorder) with the given name, optionally excluding one
    /// index — base lookups must never resolve to the deriving node itself.
    pub fn find_named(&self, name: &str, exclude: Option<NodeIndex>) -> Option<NodeIndex> {
        self.preorder()
            .into_iter()
            .find(|&idx| Some(idx) != exclude && self.node(idx).name == name)
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_prop_overwrites_in_place() {
        let mut node = Node::new("Button", 0);
        node.set_prop("size", "10 10", None);
        node.set_prop("text", "Ok", None);
        node.set_prop("size", "20 20", None);

        assert_eq!(node.props.len(), 2);
        assert_eq!(node.props[0].key, "size");
        assert_eq!(node.props[0].value, "20 20");
        assert_eq!(node.props[1].key, "text");
    }

    #[test]
    fn preorder_visits_parents_before_children() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let a = tree.add_child(root, Node::new("A", 0));
        let a1 = tree.add_child(a, Node::new("A1", 2));
        let b = tree.add_child(root, Node::new("B", 0));

        assert_eq!(tree.preorder(), vec![a, a1, b]);
        assert_eq!(tree.parent(a1), Some(a));
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn find_named_skips_excluded_index() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let first = tree.add_child(root, Node::new("Button", 0));
        let second = tree.add_child(root, Node::new("Button", 0));

        assert_eq!(tree.find_named("Button", None), Some(first));
        assert_eq!(tree.find_named("Button", Some(first)), Some(second));
        assert_eq!(tree.find_named("Missing", None), None);
    }
}
