//! HTML tree produced by lowering, rewritten by decorators and serialized.
//!
//! The tree is deliberately small: elements with ordered attributes, escaped
//! text, and raw markup. Raw nodes carry the output of the inline rewriters
//! and document-supplied HTML; they reach the serializer untouched.

pub mod lower;
pub mod serialize;

use docshelf_core::text::visible_text_of_html;

/// HTML elements serialized as `<tag />`.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// One node of the HTML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    /// An element with attributes and children.
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Markup emitted verbatim.
    Raw(String),
}

impl HtmlNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        HtmlNode::Text(value.into())
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the element if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for HtmlNode {
    fn from(element: Element) -> Self {
        HtmlNode::Element(element)
    }
}

/// An HTML element. A `None` attribute value is a boolean attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in output order.
    pub attrs: Vec<(String, Option<String>)>,
    /// Child nodes.
    pub children: Vec<HtmlNode>,
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Adds a boolean attribute.
    pub fn with_flag(mut self, name: &str) -> Self {
        self.attrs.retain(|(existing, _)| existing != name);
        self.attrs.push((name.to_string(), None));
        self
    }

    /// Replaces the children.
    pub fn with_children(mut self, children: Vec<HtmlNode>) -> Self {
        self.children = children;
        self
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.attrs.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Returns an attribute value; boolean attributes read as `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    /// Whether the attribute is present at all.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(existing, _)| existing == name)
    }

    /// Whitespace-separated class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Whether `class` is among the class names.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|existing| existing == class)
    }

    /// Appends a class name unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Depth of an `h1`-`h6` element.
    pub fn heading_depth(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Whether this is a void element.
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

/// Visits every node in pre-order. The callback may replace the node it is
/// given and returns whether to descend into the (possibly new) node.
pub fn walk_mut<F>(nodes: &mut [HtmlNode], visit: &mut F)
where
    F: FnMut(&mut HtmlNode) -> bool,
{
    for node in nodes.iter_mut() {
        if visit(node)
            && let HtmlNode::Element(element) = node
        {
            walk_mut(&mut element.children, visit);
        }
    }
}

/// Visible text of a fragment.
///
/// Raw markup contributes its visible text. Footnote reference links are
/// skipped so heading text matches the markdown source.
pub fn text_content(nodes: &[HtmlNode]) -> String {
    let mut buffer = String::new();
    collect_text(nodes, &mut buffer);
    buffer
}

fn collect_text(nodes: &[HtmlNode], buffer: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(value) => buffer.push_str(value),
            HtmlNode::Raw(value) => buffer.push_str(&visible_text_of_html(value)),
            HtmlNode::Element(element) if element.has_attr("data-footnote-ref") => {}
            HtmlNode::Element(element) => collect_text(&element.children, buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_insertion_order() {
        let mut element = Element::new("img").with_attr("src", "a.png").with_attr("alt", "");
        element.set_attr("src", "b.png");
        assert_eq!(
            element.attrs,
            vec![
                ("src".to_string(), Some("b.png".to_string())),
                ("alt".to_string(), Some(String::new())),
            ]
        );
    }

    #[test]
    fn classes_are_appended_once() {
        let mut element = Element::new("pre");
        element.add_class("language-rust");
        element.add_class("code-highlight");
        element.add_class("language-rust");
        assert_eq!(element.attr("class"), Some("language-rust code-highlight"));
        assert!(element.has_class("code-highlight"));
    }

    #[test]
    fn text_content_reads_raw_markup() {
        let nodes = vec![
            HtmlNode::text("A "),
            HtmlNode::Raw("<mark>b &amp; c</mark>".to_string()),
            Element::new("sup")
                .with_children(vec![
                    Element::new("a")
                        .with_flag("data-footnote-ref")
                        .with_children(vec![HtmlNode::text("1")])
                        .into(),
                ])
                .into(),
        ];
        assert_eq!(text_content(&nodes), "A b & c");
    }

    #[test]
    fn walk_descends_into_replacements() {
        let mut nodes = vec![HtmlNode::text("x")];
        let mut seen = 0;
        walk_mut(&mut nodes, &mut |node: &mut HtmlNode| {
            seen += 1;
            if let HtmlNode::Text(value) = node
                && value == "x"
            {
                *node = Element::new("p")
                    .with_children(vec![HtmlNode::text("y")])
                    .into();
            }
            true
        });
        assert_eq!(seen, 2);
    }
}
