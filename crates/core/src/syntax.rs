//! Owned markdown syntax tree.
//!
//! markdown-rs produces an mdast tree whose nodes have no room for render
//! hints. Documents are lifted into [`Node`], which keeps the same node kinds
//! but adds a [`NodeData`] bag that later stages use to pass attributes down
//! to the HTML lowering.

use markdown::mdast;
use std::collections::BTreeMap;

pub use markdown::unist::Position;

/// Column alignment of a GFM table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// No alignment given.
    None,
    /// `:---`
    Left,
    /// `---:`
    Right,
    /// `:---:`
    Center,
}

impl Align {
    /// HTML `align` attribute value, if any.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Right => Some("right"),
            Align::Center => Some("center"),
        }
    }
}

/// Node kind together with the fields specific to that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Document root.
    Root,
    /// Paragraph.
    Paragraph,
    /// ATX or setext heading.
    Heading {
        /// Heading depth (1-6).
        depth: u8,
    },
    /// `***`
    ThematicBreak,
    /// `> quote`
    Blockquote,
    /// Ordered or unordered list.
    List {
        /// Whether the list is ordered.
        ordered: bool,
        /// Start number of an ordered list.
        start: Option<u32>,
        /// Whether items are separated by blank lines.
        spread: bool,
    },
    /// List item, optionally a GFM task.
    ListItem {
        /// Whether the item contains blank lines between children.
        spread: bool,
        /// Task state, `None` for a regular item.
        checked: Option<bool>,
    },
    /// Fenced or indented code block.
    Code {
        /// Code content.
        value: String,
        /// Declared language.
        lang: Option<String>,
        /// Remainder of the info string.
        meta: Option<String>,
    },
    /// Display math (`$$`).
    Math {
        /// TeX source.
        value: String,
    },
    /// Raw HTML, either from the source or produced by a rewriter.
    Html {
        /// Literal markup.
        value: String,
    },
    /// Plain text.
    Text {
        /// Text content.
        value: String,
    },
    /// `*em*`
    Emphasis,
    /// `**strong**`
    Strong,
    /// `~~delete~~`
    Delete,
    /// `` `code` ``
    InlineCode {
        /// Code content.
        value: String,
    },
    /// Inline math (`$x$`).
    InlineMath {
        /// TeX source.
        value: String,
    },
    /// Hard line break.
    Break,
    /// Inline link.
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Inline image.
    Image {
        /// Source URL.
        url: String,
        /// Alternative text.
        alt: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Reference-style link resolved against a definition.
    LinkReference {
        /// Normalized identifier.
        identifier: String,
        /// Source label, used when the definition is missing.
        label: Option<String>,
    },
    /// Reference-style image resolved against a definition.
    ImageReference {
        /// Normalized identifier.
        identifier: String,
        /// Alternative text.
        alt: String,
    },
    /// `[id]: url "title"`
    Definition {
        /// Normalized identifier.
        identifier: String,
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
    },
    /// GFM table.
    Table {
        /// Per-column alignment.
        align: Vec<Align>,
    },
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// `[^id]: text`
    FootnoteDefinition {
        /// Normalized identifier.
        identifier: String,
    },
    /// `[^id]`
    FootnoteReference {
        /// Normalized identifier.
        identifier: String,
    },
}

/// Render hints attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeData {
    /// Attributes to emit on the corresponding HTML element (`hProperties`).
    pub properties: BTreeMap<String, String>,
}

impl NodeData {
    /// Sets `key` when `value` is present; an absent value never clears an
    /// earlier hint.
    pub fn merge_property(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.properties.insert(key.to_string(), value);
        }
    }

    /// Returns a hint by name.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns true when no hints are set.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A markdown syntax tree node that owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Kind and kind-specific fields.
    pub kind: NodeKind,
    /// Child nodes in document order.
    pub children: Vec<Node>,
    /// Source span, absent for generated nodes.
    pub position: Option<Position>,
    /// Render hints.
    pub data: NodeData,
}

impl Node {
    /// Creates a generated node without position or hints.
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            position: None,
            data: NodeData::default(),
        }
    }

    /// Creates a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Text {
                value: value.into(),
            },
            Vec::new(),
        )
    }

    /// Creates a raw HTML leaf.
    pub fn html(value: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Html {
                value: value.into(),
            },
            Vec::new(),
        )
    }

    /// Returns the value of a text node.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Returns the depth if this is a heading.
    pub fn heading_depth(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Heading { depth } => Some(depth),
            _ => None,
        }
    }

    /// Depth-first pre-order iteration over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Lifts a markdown-rs tree into an owned [`Node`] tree.
///
/// Node kinds that cannot occur with the configured constructs (MDX, YAML and
/// TOML front matter) are dropped.
pub fn lift(node: mdast::Node) -> Option<Node> {
    let (kind, children, position) = match node {
        mdast::Node::Root(n) => (NodeKind::Root, n.children, n.position),
        mdast::Node::Paragraph(n) => (NodeKind::Paragraph, n.children, n.position),
        mdast::Node::Heading(n) => (NodeKind::Heading { depth: n.depth }, n.children, n.position),
        mdast::Node::ThematicBreak(n) => (NodeKind::ThematicBreak, Vec::new(), n.position),
        mdast::Node::Blockquote(n) => (NodeKind::Blockquote, n.children, n.position),
        mdast::Node::List(n) => (
            NodeKind::List {
                ordered: n.ordered,
                start: n.start,
                spread: n.spread,
            },
            n.children,
            n.position,
        ),
        mdast::Node::ListItem(n) => (
            NodeKind::ListItem {
                spread: n.spread,
                checked: n.checked,
            },
            n.children,
            n.position,
        ),
        mdast::Node::Code(n) => (
            NodeKind::Code {
                value: n.value,
                lang: n.lang,
                meta: n.meta,
            },
            Vec::new(),
            n.position,
        ),
        mdast::Node::Math(n) => (NodeKind::Math { value: n.value }, Vec::new(), n.position),
        mdast::Node::Html(n) => (NodeKind::Html { value: n.value }, Vec::new(), n.position),
        mdast::Node::Text(n) => (NodeKind::Text { value: n.value }, Vec::new(), n.position),
        mdast::Node::Emphasis(n) => (NodeKind::Emphasis, n.children, n.position),
        mdast::Node::Strong(n) => (NodeKind::Strong, n.children, n.position),
        mdast::Node::Delete(n) => (NodeKind::Delete, n.children, n.position),
        mdast::Node::InlineCode(n) => (
            NodeKind::InlineCode { value: n.value },
            Vec::new(),
            n.position,
        ),
        mdast::Node::InlineMath(n) => (
            NodeKind::InlineMath { value: n.value },
            Vec::new(),
            n.position,
        ),
        mdast::Node::Break(n) => (NodeKind::Break, Vec::new(), n.position),
        mdast::Node::Link(n) => (
            NodeKind::Link {
                url: n.url,
                title: n.title,
            },
            n.children,
            n.position,
        ),
        mdast::Node::Image(n) => (
            NodeKind::Image {
                url: n.url,
                alt: n.alt,
                title: n.title,
            },
            Vec::new(),
            n.position,
        ),
        mdast::Node::LinkReference(n) => (
            NodeKind::LinkReference {
                identifier: n.identifier,
                label: n.label,
            },
            n.children,
            n.position,
        ),
        mdast::Node::ImageReference(n) => (
            NodeKind::ImageReference {
                identifier: n.identifier,
                alt: n.alt,
            },
            Vec::new(),
            n.position,
        ),
        mdast::Node::Definition(n) => (
            NodeKind::Definition {
                identifier: n.identifier,
                url: n.url,
                title: n.title,
            },
            Vec::new(),
            n.position,
        ),
        mdast::Node::Table(n) => (
            NodeKind::Table {
                align: n.align.iter().map(lift_align).collect(),
            },
            n.children,
            n.position,
        ),
        mdast::Node::TableRow(n) => (NodeKind::TableRow, n.children, n.position),
        mdast::Node::TableCell(n) => (NodeKind::TableCell, n.children, n.position),
        mdast::Node::FootnoteDefinition(n) => (
            NodeKind::FootnoteDefinition {
                identifier: n.identifier,
            },
            n.children,
            n.position,
        ),
        mdast::Node::FootnoteReference(n) => (
            NodeKind::FootnoteReference {
                identifier: n.identifier,
            },
            Vec::new(),
            n.position,
        ),
        other => {
            log::debug!("Dropping unsupported markdown node: {:?}", other);
            return None;
        }
    };

    Some(Node {
        kind,
        children: children.into_iter().filter_map(lift).collect(),
        position,
        data: NodeData::default(),
    })
}

fn lift_align(align: &mdast::AlignKind) -> Align {
    match align {
        mdast::AlignKind::Left => Align::Left,
        mdast::AlignKind::Right => Align::Right,
        mdast::AlignKind::Center => Align::Center,
        mdast::AlignKind::None => Align::None,
    }
}
