//! Line endings inside paragraphs become hard breaks.

use docshelf_core::{AstTransform, Node, NodeKind, Visit, walk};

/// Splits `value` at line endings into text and break nodes.
///
/// Spaces and tabs around each line ending are dropped.
fn split_lines(value: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = value;
    let mut first = true;

    while let Some(at) = rest.find(['\n', '\r']) {
        let line = rest[..at].trim_end_matches([' ', '\t']);
        let line = if first { line } else { line.trim_start_matches([' ', '\t']) };
        if !line.is_empty() {
            nodes.push(Node::text(line));
        }
        nodes.push(Node::new(NodeKind::Break, Vec::new()));

        let ending = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[at + ending..];
        first = false;
    }

    let rest = if first { rest } else { rest.trim_start_matches([' ', '\t']) };
    if !rest.is_empty() {
        nodes.push(Node::text(rest));
    }
    nodes
}

/// Turns every soft line ending in text into a `break` node.
#[derive(Debug, Default, Clone, Copy)]
pub struct HardBreaks;

impl AstTransform for HardBreaks {
    fn name(&self) -> &'static str {
        "hard-breaks"
    }

    fn transform(&self, root: &mut Node) {
        walk(root, &mut |node: &mut Node, _: usize, _: &NodeKind| {
            let Some(value) = node.as_text() else {
                return Visit::Continue;
            };
            if !value.contains(['\n', '\r']) {
                return Visit::SkipChildren;
            }
            Visit::Replace(split_lines(value))
        });
    }
}
