//! Visible-text extraction shared by slugging, the table of contents and search.

use crate::syntax::{Node, NodeKind};

/// Returns the text a reader would see for a fragment of raw HTML.
///
/// Tags are removed and entities decoded, so `<mark>a &amp; b</mark>` reads
/// as `a & b`.
pub fn visible_text_of_html(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Concatenates the visible text of a node's phrasing content.
///
/// Image alt text is excluded; raw HTML contributes its visible text and a
/// hard break reads as a line ending.
pub fn node_text(node: &Node) -> String {
    let mut buffer = String::new();
    collect_text(node, &mut buffer);
    buffer
}

fn collect_text(node: &Node, buffer: &mut String) {
    match &node.kind {
        NodeKind::Text { value }
        | NodeKind::InlineCode { value }
        | NodeKind::InlineMath { value } => buffer.push_str(value),
        NodeKind::Html { value } => buffer.push_str(&visible_text_of_html(value)),
        NodeKind::Break => buffer.push('\n'),
        _ => {
            for child in &node.children {
                collect_text(child, buffer);
            }
        }
    }
}

/// Returns the largest prefix of `s` not longer than `max` bytes that ends on
/// a character boundary.
pub fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut index = max;
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
