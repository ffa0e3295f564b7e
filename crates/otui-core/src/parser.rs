//! Line-oriented tokenizer and tree builder for the markup grammar.
//!
//! The grammar is indentation-sensitive (tab = 4 columns), so the outer
//! loop walks physical lines and maintains a stack of open nodes keyed by
//! indent depth. Four line shapes exist: node headers (`Name < Base`),
//! properties (`key: value`), state blocks (`$condition:`), and event
//! handlers (`@name:`, with a multi-line `|` form). Trailing `#` comments
//! are extracted first, with care not to eat hex color values.

use crate::error::{Error, Result};
use crate::model::{Event, Node, NodeIndex, NodeTree, State};

/// Indent depth in columns. Stops at the first non-whitespace character.
fn count_indent(line: &str) -> i32 {
    let mut indent = 0;
    for c in line.chars() {
        match c {
            ' ' => indent += 1,
            '\t' => indent += 4,
            _ => break,
        }
    }
    indent
}

/// Split a trailing comment off a line. The comment marker is the rightmost
/// `#` preceded by whitespace (or at column 0). When the line holds a
/// `key: value` pair whose value starts with a `#hex` color, the scan only
/// starts after the hex digits so the color is never taken for a comment.
fn split_comment(line: &str) -> (&str, Option<String>) {
    let bytes = line.as_bytes();
    let mut search_start = 0;
    if let Some(colon) = line.find(':') {
        let mut v = colon + 1;
        while v < bytes.len() && (bytes[v] == b' ' || bytes[v] == b'\t') {
            v += 1;
        }
        if v < bytes.len() && bytes[v] == b'#' {
            v += 1;
            while v < bytes.len() && bytes[v].is_ascii_hexdigit() {
                v += 1;
            }
        }
        search_start = v;
    }
    let mut i = bytes.len();
    while i > search_start {
        if bytes[i - 1] == b'#' && (i == 1 || bytes[i - 2] == b' ' || bytes[i - 2] == b'\t') {
            let comment = line[i..].trim();
            let content = &line[..i - 1];
            let comment = (!comment.is_empty()).then(|| comment.to_owned());
            return (content, comment);
        }
        i -= 1;
    }
    (line, None)
}

/// Parse a whole document into a raw node tree. Fatal errors carry 1-based
/// line numbers; everything that parses attaches to the tree as written,
/// resolution and validation happen later.
pub fn parse_document(text: &str) -> Result<NodeTree> {
    let mut tree = NodeTree::new();
    let mut stack: Vec<NodeIndex> = vec![tree.root()];
    // (node, state index) while a `$cond:` block is collecting properties.
    let mut current_state: Option<(NodeIndex, usize)> = None;
    let mut pending_comment: Option<String> = None;

    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let raw = lines[i];
        let lineno = i + 1;
        i += 1;

        let indent = count_indent(raw);
        let (stripped, mut comment) = split_comment(raw);
        let content = stripped.trim();

        if content.is_empty() {
            // Comment-only lines accumulate and attach to the next node.
            if let Some(text) = comment {
                pending_comment = Some(match pending_comment.take() {
                    Some(prev) => format!("{prev}\n{text}"),
                    None => text,
                });
            }
            continue;
        }

        // Event handler. A '@' line without a colon is not an event and
        // falls through to the node-header rule below.
        if let Some(rest) = content.strip_prefix('@') {
            if let Some((name, code)) = rest.split_once(':') {
                let owner = *stack.last().expect("stack holds at least the root");
                if owner == tree.root() {
                    return Err(Error::syntax(lineno, "event outside of any node"));
                }
                current_state = None;
                let name = name.trim().to_owned();
                let code = code.trim();
                if code.starts_with('|') {
                    // Block body: every following line more indented than
                    // the owning node, original whitespace preserved. Blank
                    // lines are skipped; the terminating line is re-examined
                    // as the next logical line.
                    let base_indent = tree.node(owner).indent;
                    let mut body: Vec<&str> = Vec::new();
                    while i < lines.len() {
                        let next = lines[i];
                        if next.trim().is_empty() {
                            i += 1;
                            continue;
                        }
                        if count_indent(next) <= base_indent {
                            break;
                        }
                        body.push(next);
                        i += 1;
                    }
                    tree.node_mut(owner).events.push(Event {
                        name,
                        code: body.join("\n"),
                        block: true,
                    });
                } else {
                    tree.node_mut(owner).events.push(Event {
                        name,
                        code: code.to_owned(),
                        block: false,
                    });
                }
                continue;
            }
        }

        // State block header. Only the first word of the condition counts;
        // `$!cond:` negates it.
        if let Some(rest) = content.strip_prefix('$') {
            if let Some((cond_part, _)) = rest.split_once(':') {
                let owner = *stack.last().expect("stack holds at least the root");
                if owner == tree.root() {
                    return Err(Error::syntax(lineno, "state outside of any node"));
                }
                let mut cond = cond_part.trim();
                let negated = cond.starts_with('!');
                if negated {
                    cond = cond[1..].trim_start();
                }
                let condition = cond.split_whitespace().next().unwrap_or("").to_owned();
                let node = tree.node_mut(owner);
                node.states.push(State {
                    condition,
                    negated,
                    props: Vec::new(),
                });
                current_state = Some((owner, node.states.len() - 1));
                continue;
            }
        }

        match content.split_once(':') {
            // No colon: node header, closes any open state block.
            None => {
                current_state = None;
                let (name, base_style) = match content.split_once('<') {
                    Some((n, b)) => (n.trim(), Some(b.trim().to_owned())),
                    None => (content, None),
                };
                while let Some(&top) = stack.last() {
                    if tree.node(top).indent < indent {
                        break;
                    }
                    stack.pop();
                }
                let Some(&parent) = stack.last() else {
                    return Err(Error::syntax(lineno, "indentation error"));
                };
                let mut node = Node::new(name, indent);
                node.base_style = base_style.filter(|b| !b.is_empty());
                node.comment_before = pending_comment.take();
                node.comment_inline = comment.take();
                let idx = tree.add_child(parent, node);
                stack.push(idx);
            }
            // Property, attaches to the open state or the open node.
            Some((key, value)) => {
                let owner = *stack.last().expect("stack holds at least the root");
                if owner == tree.root() {
                    return Err(Error::syntax(lineno, "property outside of any node"));
                }
                let key = key.trim();
                let value = value.trim();
                match current_state {
                    Some((node_idx, state_idx)) => {
                        tree.node_mut(node_idx).states[state_idx].set_prop(
                            key,
                            value,
                            comment.take(),
                        );
                    }
                    None => tree.node_mut(owner).set_prop(key, value, comment.take()),
                }
            }
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names_of(tree: &NodeTree, parent: NodeIndex) -> Vec<&str> {
        tree.children(parent)
            .iter()
            .map(|&c| tree.node(c).name.as_str())
            .collect()
    }

    #[test]
    fn nesting_follows_indent() {
        let tree = parse_document(
            "MainWindow\n  Button\n    Label\n  Panel\nOtherWindow\n",
        )
        .unwrap();
        let root = tree.root();
        assert_eq!(names_of(&tree, root), vec!["MainWindow", "OtherWindow"]);
        let main = tree.children(root)[0];
        assert_eq!(names_of(&tree, main), vec!["Button", "Panel"]);
        let button = tree.children(main)[0];
        assert_eq!(names_of(&tree, button), vec!["Label"]);
    }

    #[test]
    fn tab_counts_as_four_columns() {
        let tree = parse_document("MainWindow\n\tButton\n    Panel\n").unwrap();
        let main = tree.children(tree.root())[0];
        // Both children sit at depth 4, so they are siblings.
        assert_eq!(names_of(&tree, main), vec!["Button", "Panel"]);
    }

    #[test]
    fn header_with_base_style() {
        let tree = parse_document("OkButton < Button\n").unwrap();
        let node = tree.node(tree.children(tree.root())[0]);
        assert_eq!(node.name, "OkButton");
        assert_eq!(node.base_style.as_deref(), Some("Button"));
    }

    #[test]
    fn hex_value_is_not_a_comment() {
        let tree = parse_document("Label\n  color: #ff0000\n").unwrap();
        let label = tree.node(tree.children(tree.root())[0]);
        assert_eq!(label.prop("color"), Some("#ff0000"));
        assert_eq!(label.props[0].comment, None);
    }

    #[test]
    fn comment_after_hex_value_is_kept() {
        let tree = parse_document("Label\n  color: #ff0000 # warning tint\n").unwrap();
        let label = tree.node(tree.children(tree.root())[0]);
        assert_eq!(label.prop("color"), Some("#ff0000"));
        assert_eq!(label.props[0].comment.as_deref(), Some("warning tint"));
    }

    #[test]
    fn pending_comments_attach_to_next_node() {
        let tree = parse_document(
            "# login form\n# two lines\nMainWindow # inline\n  size: 100 100\n",
        )
        .unwrap();
        let main = tree.node(tree.children(tree.root())[0]);
        assert_eq!(main.comment_before.as_deref(), Some("login form\ntwo lines"));
        assert_eq!(main.comment_inline.as_deref(), Some("inline"));
    }

    #[test]
    fn duplicate_key_overwrites_in_place() {
        let tree = parse_document("Button\n  size: 10 10\n  text: Ok\n  size: 20 20\n").unwrap();
        let button = tree.node(tree.children(tree.root())[0]);
        assert_eq!(button.props.len(), 2);
        assert_eq!(button.props[0].value, "20 20");
    }

    #[test]
    fn single_line_event() {
        let tree = parse_document("Button\n  @onClick: doThing()\n").unwrap();
        let button = tree.node(tree.children(tree.root())[0]);
        assert_eq!(button.events.len(), 1);
        assert_eq!(button.events[0].name, "onClick");
        assert_eq!(button.events[0].code, "doThing()");
        assert!(!button.events[0].block);
    }

    #[test]
    fn block_event_reprocesses_terminating_line() {
        let text = "Button\n  @onClick: |\n    local a = 1\n\n    use(a)\nPanel\n  text: Ok\n";
        let tree = parse_document(text).unwrap();
        let root = tree.root();
        assert_eq!(names_of(&tree, root), vec!["Button", "Panel"]);
        let button = tree.node(tree.children(root)[0]);
        assert_eq!(button.events[0].code, "    local a = 1\n    use(a)");
        assert!(button.events[0].block);
        // The Panel header that ended the block was parsed normally.
        let panel = tree.node(tree.children(root)[1]);
        assert_eq!(panel.prop("text"), Some("Ok"));
    }

    #[test]
    fn block_event_swallows_deeper_property_lines() {
        // Everything more indented than the owning node belongs to the
        // block body, even lines shaped like properties.
        let text = "Button\n  @onClick: |\n    go()\n  text: Ok\n";
        let tree = parse_document(text).unwrap();
        let button = tree.node(tree.children(tree.root())[0]);
        assert_eq!(button.events[0].code, "    go()\n  text: Ok");
        assert_eq!(button.prop("text"), None);
    }

    #[test]
    fn state_blocks_collect_properties() {
        let text = "Button\n  $hover:\n    color: white\n  $!disabled extra:\n    opacity: 1\n";
        let tree = parse_document(text).unwrap();
        let button = tree.node(tree.children(tree.root())[0]);
        assert_eq!(button.states.len(), 2);
        assert_eq!(button.states[0].condition, "hover");
        assert!(!button.states[0].negated);
        assert_eq!(button.states[0].props[0].key, "color");
        // Only the first word of the condition is kept.
        assert_eq!(button.states[1].condition, "disabled");
        assert!(button.states[1].negated);
        assert_eq!(button.states[1].props[0].key, "opacity");
    }

    #[test]
    fn event_line_closes_open_state() {
        let text = "Button\n  $hover:\n    color: white\n  @onClick: go()\n  opacity: 1\n";
        let tree = parse_document(text).unwrap();
        let button = tree.node(tree.children(tree.root())[0]);
        assert_eq!(button.states[0].props.len(), 1);
        // `opacity` lands on the node, not on the hover state.
        assert_eq!(button.prop("opacity"), Some("1"));
    }

    #[test]
    fn property_outside_node_is_fatal() {
        let err = parse_document("\nsize: 10 10\n").unwrap_err();
        match err {
            Error::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn event_outside_node_is_fatal() {
        assert!(parse_document("@onClick: go()\n").is_err());
    }

    #[test]
    fn at_line_without_colon_is_a_node() {
        let tree = parse_document("@weird\n").unwrap();
        assert_eq!(tree.node(tree.children(tree.root())[0]).name, "@weird");
    }
}
