//! HTML tree to string.

use super::{Element, HtmlNode};

/// Serializes a fragment.
///
/// Text is entity-escaped, attribute values are escaped for double quotes,
/// void elements self-close as `<br />`, and raw nodes are written verbatim.
pub fn to_html(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Element(element) => write_element(element, out),
            HtmlNode::Text(value) => out.push_str(&html_escape::encode_text(value)),
            HtmlNode::Raw(value) => out.push_str(value),
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
    }

    if element.is_void() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    write_nodes(&element.children, out);
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}
