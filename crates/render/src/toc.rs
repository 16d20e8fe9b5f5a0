//! Table of contents generation.
//!
//! A heading whose text matches the configured title marks where the table
//! goes. Everything between that heading and the next heading of the same or
//! a shallower depth is replaced by a nested list linking to the headings that
//! follow the section.

use crate::options::RenderOptions;
use docshelf_core::text::node_text;
use docshelf_core::{AstTransform, Node, NodeKind, Slugger};
use serde::Serialize;

/// A heading in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Heading depth (1-6).
    pub depth: u8,
    /// Slug without the configured id prefix.
    pub slug: String,
    /// Visible heading text.
    pub text: String,
}

/// Lists every heading of a syntax tree, slugged in document order.
pub fn outline(root: &Node) -> Vec<HeadingEntry> {
    let mut slugger = Slugger::new();
    root.descendants()
        .filter_map(|node| {
            let depth = node.heading_depth()?;
            let text = node_text(node);
            Some(HeadingEntry {
                depth,
                slug: slugger.slug(&text),
                text: text.trim().to_string(),
            })
        })
        .collect()
}

struct TocEntry {
    depth: u8,
    slug: String,
    children: Vec<Node>,
}

/// Inserts the generated table of contents under the matching heading.
#[derive(Debug, Clone)]
pub struct TableOfContents {
    heading_title: String,
    max_depth: u8,
    ordered: bool,
    tight: bool,
    id_prefix: String,
}

impl TableOfContents {
    /// Takes the TOC settings from render options.
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            heading_title: options.toc_heading_title.trim().to_lowercase(),
            max_depth: options.effective_toc_depth(),
            ordered: options.toc_ordered,
            tight: options.toc_tight,
            id_prefix: options.id_prefix.clone(),
        }
    }

    /// Finds the root-level heading that opens the section and the index of
    /// the first root-level heading that closes it.
    fn section(&self, root: &Node) -> Option<(usize, usize)> {
        let mut headings = root
            .children
            .iter()
            .enumerate()
            .filter_map(|(position, child)| Some((position, child.heading_depth()?, child)));

        let (opening_index, opening_depth) = headings.find_map(|(position, depth, node)| {
            (node_text(node).trim().to_lowercase() == self.heading_title)
                .then_some((position, depth))
        })?;
        let (end_index, _, _) = headings.find(|(_, depth, _)| *depth <= opening_depth)?;
        Some((opening_index, end_index))
    }

    /// Finds the replacement range among the root's children and builds the
    /// list that goes there.
    fn build(&self, root: &Node) -> Option<(usize, usize, Node)> {
        let (opening_index, end_index) = self.section(root)?;
        let replaced = opening_index + 1..end_index;
        let mut slugger = Slugger::new();
        let mut entries = Vec::new();

        for (position, child) in root.children.iter().enumerate() {
            // Headings in the replaced section never reach the slug decorator.
            if replaced.contains(&position) {
                continue;
            }
            for node in child.descendants() {
                let Some(depth) = node.heading_depth() else {
                    continue;
                };
                // Nested headings still take a slug so ids line up with the
                // rendered document.
                let text = node_text(node);
                let slug = slugger.slug(&text);
                if position < end_index || !std::ptr::eq(node, child) {
                    continue;
                }
                if depth <= self.max_depth && !text.trim().is_empty() {
                    entries.push(TocEntry {
                        depth,
                        slug,
                        children: toc_phrasing(&node.children),
                    });
                }
            }
        }

        if entries.is_empty() {
            return None;
        }
        Some((opening_index + 1, end_index, self.contents(entries)))
    }

    fn contents(&self, entries: Vec<TocEntry>) -> Node {
        let min_depth = entries.iter().map(|entry| entry.depth).min().unwrap_or(1);
        let mut list = self.empty_list();
        for mut entry in entries {
            entry.depth -= min_depth - 1;
            self.insert(entry, &mut list);
        }
        list
    }

    fn empty_list(&self) -> Node {
        Node::new(
            NodeKind::List {
                ordered: self.ordered,
                start: None,
                spread: false,
            },
            Vec::new(),
        )
    }

    fn insert(&self, mut entry: TocEntry, parent: &mut Node) {
        let is_list = matches!(parent.kind, NodeKind::List { .. });
        let last_is = |parent: &Node, list: bool| {
            parent.children.last().is_some_and(|tail| match tail.kind {
                NodeKind::List { .. } => list,
                NodeKind::ListItem { .. } => !list,
                _ => false,
            })
        };

        if is_list {
            if entry.depth == 1 {
                parent.children.push(self.entry_item(entry));
            } else {
                if !last_is(parent, false) {
                    parent.children.push(list_item(Vec::new()));
                }
                if let Some(tail) = parent.children.last_mut() {
                    self.insert(entry, tail);
                }
            }
        } else if matches!(parent.kind, NodeKind::ListItem { .. }) {
            if !last_is(parent, true) {
                parent.children.push(self.empty_list());
            }
            entry.depth -= 1;
            if let Some(tail) = parent.children.last_mut() {
                self.insert(entry, tail);
            }
        }

        let any_spread_item = parent
            .children
            .iter()
            .any(|child| matches!(child.kind, NodeKind::ListItem { spread: true, .. }));
        match &mut parent.kind {
            NodeKind::List { spread, .. } => *spread = !self.tight && any_spread_item,
            NodeKind::ListItem { spread, .. } => *spread = !self.tight,
            _ => {}
        }
    }

    fn entry_item(&self, entry: TocEntry) -> Node {
        let link = Node::new(
            NodeKind::Link {
                url: format!("#{}{}", self.id_prefix, entry.slug),
                title: None,
            },
            entry.children,
        );
        list_item(vec![Node::new(NodeKind::Paragraph, vec![link])])
    }
}

fn list_item(children: Vec<Node>) -> Node {
    Node::new(
        NodeKind::ListItem {
            spread: false,
            checked: None,
        },
        children,
    )
}

/// Copies heading content for a TOC entry: links are unwrapped and footnote
/// references dropped.
fn toc_phrasing(nodes: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node.kind {
            NodeKind::FootnoteReference { .. } => {}
            NodeKind::Link { .. } | NodeKind::LinkReference { .. } => {
                out.extend(toc_phrasing(&node.children));
            }
            _ => out.push(Node {
                kind: node.kind.clone(),
                children: toc_phrasing(&node.children),
                position: None,
                data: node.data.clone(),
            }),
        }
    }
    out
}

impl AstTransform for TableOfContents {
    fn name(&self) -> &'static str {
        "toc"
    }

    fn transform(&self, root: &mut Node) {
        match self.build(root) {
            Some((start, end, list)) => {
                root.children.splice(start..end, std::iter::once(list));
            }
            None => log::debug!("No table of contents inserted"),
        }
    }
}
