//! Generic tree walking for syntax tree rewriters.
//!
//! A [`Visitor`] sees each node together with its index and its parent's
//! kind, and answers with a [`Visit`] telling the driver what to do. Nodes a
//! visitor splices in are never visited again, so a rewriter cannot match its
//! own output.

use crate::syntax::{Node, NodeKind};

/// Instruction returned by a [`Visitor`] for one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Keep the node and descend into its children.
    Continue,
    /// Keep the node but do not descend.
    SkipChildren,
    /// Replace the node with a sequence of nodes, spliced in place.
    Replace(Vec<Node>),
}

/// A tree rewriting capability applied by [`walk`].
pub trait Visitor {
    /// Called for every node below the root in pre-order.
    fn visit(&mut self, node: &mut Node, index: usize, parent: &NodeKind) -> Visit;
}

impl<F> Visitor for F
where
    F: FnMut(&mut Node, usize, &NodeKind) -> Visit,
{
    fn visit(&mut self, node: &mut Node, index: usize, parent: &NodeKind) -> Visit {
        (self)(node, index, parent)
    }
}

/// Walks every descendant of `root`, applying `visitor`.
pub fn walk<V: Visitor + ?Sized>(root: &mut Node, visitor: &mut V) {
    let Node { kind, children, .. } = root;
    let mut index = 0;
    while index < children.len() {
        match visitor.visit(&mut children[index], index, kind) {
            Visit::Continue => {
                walk(&mut children[index], visitor);
                index += 1;
            }
            Visit::SkipChildren => index += 1,
            Visit::Replace(nodes) => {
                let count = nodes.len();
                children.splice(index..=index, nodes);
                index += count;
            }
        }
    }
}

/// One occurrence of an inline construct inside a text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch {
    /// Byte offset where the construct starts.
    pub start: usize,
    /// Byte offset just past the construct.
    pub end: usize,
    /// Markup that replaces the construct.
    pub html: String,
}

/// Finds non-overlapping constructs in a text value, left to right.
pub trait InlineScanner {
    /// Returns matches ordered by `start`, with no overlaps.
    fn scan(&self, value: &str) -> Vec<InlineMatch>;
}

/// Adapts an [`InlineScanner`] into a [`Visitor`] over text nodes.
///
/// Each text node with at least one match is replaced by the text between
/// matches interleaved with one raw HTML node per match. Text nodes without
/// matches are left exactly as they were.
pub struct TextRewriter<S> {
    scanner: S,
}

impl<S: InlineScanner> TextRewriter<S> {
    /// Wraps a scanner.
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }

    /// Applies the scanner to every text node in `root`.
    pub fn apply(mut self, root: &mut Node) {
        walk(root, &mut self);
    }
}

impl<S: InlineScanner> Visitor for TextRewriter<S> {
    fn visit(&mut self, node: &mut Node, _index: usize, _parent: &NodeKind) -> Visit {
        let Some(value) = node.as_text() else {
            return Visit::Continue;
        };

        let matches = self.scanner.scan(value);
        if matches.is_empty() {
            return Visit::SkipChildren;
        }

        Visit::Replace(splice_matches(value, matches))
    }
}

fn splice_matches(value: &str, matches: Vec<InlineMatch>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(matches.len() * 2 + 1);
    let mut last = 0;
    for m in matches {
        if m.start > last {
            nodes.push(Node::text(&value[last..m.start]));
        }
        nodes.push(Node::html(m.html));
        last = m.end;
    }
    if last < value.len() {
        nodes.push(Node::text(&value[last..]));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stars;

    impl InlineScanner for Stars {
        fn scan(&self, value: &str) -> Vec<InlineMatch> {
            value
                .match_indices('*')
                .map(|(start, _)| InlineMatch {
                    start,
                    end: start + 1,
                    html: "<b>*</b>".to_string(),
                })
                .collect()
        }
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::new(
            NodeKind::Root,
            vec![Node::new(NodeKind::Paragraph, children)],
        )
    }

    #[test]
    fn splices_matches_in_order() {
        let mut root = paragraph(vec![Node::text("a*b*")]);
        TextRewriter::new(Stars).apply(&mut root);
        let para = &root.children[0];
        assert_eq!(
            para.children,
            vec![
                Node::text("a"),
                Node::html("<b>*</b>"),
                Node::text("b"),
                Node::html("<b>*</b>"),
            ]
        );
    }

    #[test]
    fn leaves_unmatched_text_untouched() {
        let mut root = paragraph(vec![Node::text("plain")]);
        let before = root.clone();
        TextRewriter::new(Stars).apply(&mut root);
        assert_eq!(root, before);
    }

    #[test]
    fn does_not_revisit_spliced_nodes() {
        let mut root = paragraph(vec![Node::text("x"), Node::text("y")]);
        let mut visits = 0;
        walk(&mut root, &mut |node: &mut Node, _: usize, _: &NodeKind| {
            if node.as_text() == Some("x") {
                visits += 1;
                return Visit::Replace(vec![Node::text("x"), Node::text("x")]);
            }
            Visit::Continue
        });
        assert_eq!(visits, 1);
        assert_eq!(root.children[0].children.len(), 3);
    }

    #[test]
    fn passes_parent_kind_and_index() {
        let mut root = paragraph(vec![Node::text("a"), Node::text("b")]);
        let mut seen = Vec::new();
        walk(&mut root, &mut |node: &mut Node, index: usize, parent: &NodeKind| {
            if let Some(text) = node.as_text() {
                seen.push((text.to_string(), index, parent.clone()));
            }
            Visit::Continue
        });
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), 0, NodeKind::Paragraph),
                ("b".to_string(), 1, NodeKind::Paragraph),
            ]
        );
    }
}
