//! Markdown syntax tree to HTML tree.
//!
//! Block children are separated by `"\n"` text nodes so the serialized output
//! keeps one block per line. Render hints on a node become attributes on its
//! element (`className` is emitted as `class`). Raw HTML nodes, whether from
//! the document or from the inline rewriters, are passed through verbatim.

use super::{Element, HtmlNode};
use docshelf_core::{Align, Node, NodeData, NodeKind};
use std::collections::HashMap;

const CLOBBER_PREFIX: &str = "user-content-";

struct Definition<'a> {
    url: &'a str,
    title: Option<&'a str>,
}

/// Lowering state for one document.
struct Lowering<'a> {
    definitions: HashMap<&'a str, Definition<'a>>,
    footnote_definitions: HashMap<&'a str, &'a Node>,
    footnote_order: Vec<&'a str>,
    footnote_counts: HashMap<&'a str, usize>,
}

/// Lowers a syntax tree root into an HTML fragment.
pub fn lower(root: &Node) -> Vec<HtmlNode> {
    let mut state = Lowering::new(root);
    let mut nodes = wrap(state.all(root), false);
    if let Some(footer) = state.footer() {
        nodes.push(HtmlNode::text("\n"));
        nodes.push(footer.into());
    }
    nodes
}

impl<'a> Lowering<'a> {
    fn new(root: &'a Node) -> Self {
        let mut definitions = HashMap::new();
        let mut footnote_definitions = HashMap::new();
        for node in root.descendants() {
            match &node.kind {
                NodeKind::Definition {
                    identifier,
                    url,
                    title,
                } => {
                    // First definition wins.
                    definitions.entry(identifier.as_str()).or_insert(Definition {
                        url,
                        title: title.as_deref(),
                    });
                }
                NodeKind::FootnoteDefinition { identifier } => {
                    footnote_definitions.entry(identifier.as_str()).or_insert(node);
                }
                _ => {}
            }
        }

        Self {
            definitions,
            footnote_definitions,
            footnote_order: Vec::new(),
            footnote_counts: HashMap::new(),
        }
    }

    fn resolve(&self, identifier: &str) -> Option<(&'a str, Option<&'a str>)> {
        self.definitions
            .get(identifier)
            .map(|definition| (definition.url, definition.title))
    }

    fn all(&mut self, parent: &'a Node) -> Vec<HtmlNode> {
        let mut out = Vec::with_capacity(parent.children.len());
        for child in &parent.children {
            out.extend(self.one(child, parent));
        }
        out
    }

    fn one(&mut self, node: &'a Node, parent: &'a Node) -> Vec<HtmlNode> {
        let element = match &node.kind {
            NodeKind::Root => return self.all(node),
            NodeKind::Text { value } => return vec![HtmlNode::text(trim_lines(value))],
            NodeKind::Html { value } => return vec![HtmlNode::Raw(value.clone())],
            NodeKind::Break => {
                return vec![Element::new("br").into(), HtmlNode::text("\n")];
            }
            NodeKind::Definition { .. } | NodeKind::FootnoteDefinition { .. } => {
                return Vec::new();
            }

            NodeKind::Paragraph => Element::new("p").with_children(self.all(node)),
            NodeKind::Heading { depth } => {
                Element::new(format!("h{depth}")).with_children(self.all(node))
            }
            NodeKind::ThematicBreak => Element::new("hr"),
            NodeKind::Blockquote => {
                Element::new("blockquote").with_children(wrap(self.all(node), true))
            }
            NodeKind::List { ordered, start, .. } => self.list(node, *ordered, *start),
            NodeKind::ListItem { checked, .. } => self.list_item(node, *checked, parent),
            NodeKind::Code { value, lang, .. } => code_block(value, lang.as_deref()),
            NodeKind::Math { value } => {
                let code = Element::new("code")
                    .with_attr("class", "language-math math-display")
                    .with_children(vec![HtmlNode::text(value.clone())]);
                Element::new("pre").with_children(vec![code.into()])
            }
            NodeKind::Emphasis => Element::new("em").with_children(self.all(node)),
            NodeKind::Strong => Element::new("strong").with_children(self.all(node)),
            NodeKind::Delete => Element::new("del").with_children(self.all(node)),
            NodeKind::InlineCode { value } => Element::new("code")
                .with_children(vec![HtmlNode::text(collapse_line_endings(value))]),
            NodeKind::InlineMath { value } => Element::new("code")
                .with_attr("class", "language-math math-inline")
                .with_children(vec![HtmlNode::text(value.clone())]),
            NodeKind::Link { url, title } => link(url, title.as_deref(), self.all(node)),
            NodeKind::Image { url, alt, title } => image(url, alt, title.as_deref()),
            NodeKind::LinkReference { identifier, label } => {
                match self.resolve(identifier) {
                    Some((url, title)) => link(url, title, self.all(node)),
                    None => {
                        log::debug!("Unresolved link reference '{}'", identifier);
                        let mut out = vec![HtmlNode::text("[")];
                        out.extend(self.all(node));
                        out.push(HtmlNode::text(format!(
                            "]{}",
                            label.as_deref().map(|l| format!("[{l}]")).unwrap_or_default()
                        )));
                        return out;
                    }
                }
            }
            NodeKind::ImageReference { identifier, alt } => {
                match self.resolve(identifier) {
                    Some((url, title)) => image(url, alt, title),
                    None => return vec![HtmlNode::text(format!("![{alt}]"))],
                }
            }
            NodeKind::Table { .. } => self.table(node),
            NodeKind::TableRow | NodeKind::TableCell => {
                // Only reachable through `table`.
                return self.all(node);
            }
            NodeKind::FootnoteReference { identifier } => self.footnote_reference(identifier),
        };

        vec![apply_data(element, &node.data).into()]
    }

    fn list(&mut self, node: &'a Node, ordered: bool, start: Option<u32>) -> Element {
        let items = self.all(node);
        let mut element = Element::new(if ordered { "ol" } else { "ul" });
        if ordered && let Some(start) = start.filter(|start| *start != 1) {
            element.set_attr("start", start.to_string());
        }
        let has_task = items.iter().any(|item| {
            item.as_element()
                .is_some_and(|li| li.has_class("task-list-item"))
        });
        if has_task {
            element.set_attr("class", "contains-task-list");
        }
        element.with_children(wrap(items, true))
    }

    fn list_item(&mut self, node: &'a Node, checked: Option<bool>, parent: &'a Node) -> Element {
        let mut results = self.all(node);
        let loose = match parent.kind {
            NodeKind::List { .. } => list_loose(parent),
            _ => item_loose(node),
        };

        let mut element = Element::new("li");
        if let Some(checked) = checked {
            let starts_with_paragraph = results
                .first()
                .and_then(HtmlNode::as_element)
                .is_some_and(|head| head.tag == "p");
            if !starts_with_paragraph {
                results.insert(0, Element::new("p").into());
            }
            if let Some(HtmlNode::Element(paragraph)) = results.first_mut() {
                if !paragraph.children.is_empty() {
                    paragraph.children.insert(0, HtmlNode::text(" "));
                }
                let mut input = Element::new("input").with_attr("type", "checkbox");
                if checked {
                    input = input.with_flag("checked");
                }
                paragraph.children.insert(0, input.with_flag("disabled").into());
            }
            element.set_attr("class", "task-list-item");
        }

        let is_paragraph = |node: &HtmlNode| node.as_element().is_some_and(|e| e.tag == "p");
        let tail_needs_newline = results.last().is_some_and(|tail| loose || !is_paragraph(tail));

        let mut children = Vec::new();
        for (index, child) in results.into_iter().enumerate() {
            if loose || index != 0 || !is_paragraph(&child) {
                children.push(HtmlNode::text("\n"));
            }
            match child {
                HtmlNode::Element(paragraph) if paragraph.tag == "p" && !loose => {
                    children.extend(paragraph.children);
                }
                other => children.push(other),
            }
        }
        if tail_needs_newline {
            children.push(HtmlNode::text("\n"));
        }

        element.with_children(children)
    }

    fn table(&mut self, node: &'a Node) -> Element {
        let align: &[Align] = match &node.kind {
            NodeKind::Table { align } => align,
            _ => &[],
        };

        let mut rows = node.children.iter().enumerate().map(|(row_index, row)| {
            let tag = if row_index == 0 { "th" } else { "td" };
            row.children
                .iter()
                .enumerate()
                .map(|(cell_index, cell)| {
                    let mut element = Element::new(tag);
                    if let Some(value) = align.get(cell_index).and_then(|a| a.as_attr()) {
                        element.set_attr("align", value);
                    }
                    (element, cell)
                })
                .collect::<Vec<_>>()
        });

        let mut sections = Vec::new();
        if let Some(head) = rows.next() {
            let row = self.table_row(head);
            sections.push(
                Element::new("thead")
                    .with_children(wrap(vec![row.into()], true))
                    .into(),
            );
        }
        let body: Vec<HtmlNode> = rows.map(|cells| self.table_row(cells).into()).collect();
        if !body.is_empty() {
            sections.push(Element::new("tbody").with_children(wrap(body, true)).into());
        }

        Element::new("table").with_children(wrap(sections, true))
    }

    fn table_row(&mut self, cells: Vec<(Element, &'a Node)>) -> Element {
        let cells = cells
            .into_iter()
            .map(|(element, cell)| element.with_children(self.all(cell)).into())
            .collect();
        Element::new("tr").with_children(wrap(cells, true))
    }

    fn footnote_reference(&mut self, identifier: &'a str) -> Element {
        let safe_id = normalize_uri(&identifier.to_lowercase());
        let counter = match self.footnote_order.iter().position(|id| *id == identifier) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(identifier);
                self.footnote_order.len()
            }
        };
        let reuse = self.footnote_counts.entry(identifier).or_insert(0);
        *reuse += 1;
        let suffix = if *reuse > 1 {
            format!("-{}", reuse)
        } else {
            String::new()
        };

        let link = Element::new("a")
            .with_attr("href", format!("#{CLOBBER_PREFIX}fn-{safe_id}"))
            .with_attr("id", format!("{CLOBBER_PREFIX}fnref-{safe_id}{suffix}"))
            .with_flag("data-footnote-ref")
            .with_attr("aria-describedby", "footnote-label")
            .with_children(vec![HtmlNode::text(counter.to_string())]);
        Element::new("sup").with_children(vec![link.into()])
    }

    /// Builds the footnotes section for every referenced definition.
    fn footer(&mut self) -> Option<Element> {
        let mut items = Vec::new();

        // Lowering a definition can reference further footnotes, which are
        // appended to the order and picked up by this loop.
        let mut index = 0;
        while index < self.footnote_order.len() {
            let identifier = self.footnote_order[index];
            index += 1;
            let Some(definition) = self.footnote_definitions.get(identifier).copied() else {
                log::debug!("Footnote '{}' has no definition", identifier);
                continue;
            };
            let safe_id = normalize_uri(&identifier.to_lowercase());
            let references = self.footnote_counts.get(identifier).copied().unwrap_or(1);

            let mut backrefs = Vec::new();
            for reference in 1..=references {
                if reference > 1 || !backrefs.is_empty() {
                    backrefs.push(HtmlNode::text(" "));
                }
                let suffix = if reference > 1 {
                    format!("-{reference}")
                } else {
                    String::new()
                };
                let mut children = vec![HtmlNode::text("↩")];
                if reference > 1 {
                    children.push(
                        Element::new("sup")
                            .with_children(vec![HtmlNode::text(reference.to_string())])
                            .into(),
                    );
                }
                backrefs.push(
                    Element::new("a")
                        .with_attr("href", format!("#{CLOBBER_PREFIX}fnref-{safe_id}{suffix}"))
                        .with_attr("data-footnote-backref", "")
                        .with_attr(
                            "aria-label",
                            format!("Back to reference {}{}", index, suffix),
                        )
                        .with_attr("class", "data-footnote-backref")
                        .with_children(children)
                        .into(),
                );
            }

            let mut content = self.all(definition);
            match content.last_mut() {
                Some(HtmlNode::Element(tail)) if tail.tag == "p" => {
                    tail.children.push(HtmlNode::text(" "));
                    tail.children.extend(backrefs);
                }
                _ => content.extend(backrefs),
            }

            items.push(
                Element::new("li")
                    .with_attr("id", format!("{CLOBBER_PREFIX}fn-{safe_id}"))
                    .with_children(wrap(content, true))
                    .into(),
            );
        }

        if items.is_empty() {
            return None;
        }

        let label = Element::new("h2")
            .with_attr("class", "sr-only")
            .with_attr("id", "footnote-label")
            .with_children(vec![HtmlNode::text("Footnotes")]);
        let list = Element::new("ol").with_children(wrap(items, true));
        Some(
            Element::new("section")
                .with_flag("data-footnotes")
                .with_attr("class", "footnotes")
                .with_children(wrap(vec![label.into(), list.into()], true)),
        )
    }
}

fn list_loose(list: &Node) -> bool {
    let spread = matches!(list.kind, NodeKind::List { spread: true, .. });
    spread || list.children.iter().any(item_loose)
}

fn item_loose(item: &Node) -> bool {
    matches!(item.kind, NodeKind::ListItem { spread: true, .. })
}

/// Joins nodes with `"\n"` text, optionally also before and after.
fn wrap(nodes: Vec<HtmlNode>, loose: bool) -> Vec<HtmlNode> {
    let mut out = Vec::with_capacity(nodes.len() * 2 + 1);
    let has_nodes = !nodes.is_empty();
    if loose {
        out.push(HtmlNode::text("\n"));
    }
    for (index, node) in nodes.into_iter().enumerate() {
        if index > 0 {
            out.push(HtmlNode::text("\n"));
        }
        out.push(node);
    }
    if loose && has_nodes {
        out.push(HtmlNode::text("\n"));
    }
    out
}

fn code_block(value: &str, lang: Option<&str>) -> Element {
    let mut code = Element::new("code");
    if let Some(lang) = lang {
        code.set_attr("class", format!("language-{lang}"));
    }
    let text = if value.is_empty() {
        String::new()
    } else {
        format!("{value}\n")
    };
    let code = code.with_children(vec![HtmlNode::text(text)]);
    Element::new("pre").with_children(vec![code.into()])
}

fn link(url: &str, title: Option<&str>, children: Vec<HtmlNode>) -> Element {
    let mut element = Element::new("a").with_attr("href", normalize_uri(url));
    if let Some(title) = title {
        element.set_attr("title", title);
    }
    element.with_children(children)
}

fn image(url: &str, alt: &str, title: Option<&str>) -> Element {
    let mut element = Element::new("img")
        .with_attr("src", normalize_uri(url))
        .with_attr("alt", alt);
    if let Some(title) = title {
        element.set_attr("title", title);
    }
    element
}

/// Copies render hints onto the element.
fn apply_data(mut element: Element, data: &NodeData) -> Element {
    for (key, value) in &data.properties {
        match key.as_str() {
            "className" => element.add_class(value),
            _ => element.set_attr(key, value.clone()),
        }
    }
    element
}

/// Removes spaces and tabs around line endings.
fn trim_lines(value: &str) -> String {
    if !value.contains(['\n', '\r']) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut first = true;
    while let Some(at) = rest.find(['\n', '\r']) {
        let line = &rest[..at];
        let line = if first { line } else { line.trim_start_matches([' ', '\t']) };
        out.push_str(line.trim_end_matches([' ', '\t']));
        let ending = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
        out.push_str(&rest[at..at + ending]);
        rest = &rest[at + ending..];
        first = false;
    }
    out.push_str(rest.trim_start_matches([' ', '\t']));
    out
}

fn collapse_line_endings(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Percent-encodes characters that are not safe in a URL, leaving valid
/// `%XX` escapes alone.
fn normalize_uri(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut index = 0;
    for ch in url.chars() {
        let at = index;
        index += ch.len_utf8();

        if ch == '%'
            && bytes.get(at + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(at + 2).is_some_and(u8::is_ascii_hexdigit)
        {
            out.push(ch);
            continue;
        }
        if ch.is_ascii() && is_uri_safe(ch as u8) {
            out.push(ch);
            continue;
        }
        let mut buffer = [0u8; 4];
        for byte in ch.encode_utf8(&mut buffer).bytes() {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn is_uri_safe(byte: u8) -> bool {
    matches!(byte, b'!' | b'#' | b'$' | b'&'..=b';' | b'=' | b'?'..=b'Z' | b'_' | b'a'..=b'z' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::serialize::to_html;
    use docshelf_core::parse_markdown;

    fn html(markdown: &str) -> String {
        let root = parse_markdown(markdown, &Default::default()).unwrap();
        to_html(&lower(&root))
    }

    #[test]
    fn blocks_are_newline_separated() {
        assert_eq!(html("# Title\n\nSome *text*."), "<h1>Title</h1>\n<p>Some <em>text</em>.</p>");
    }

    #[test]
    fn tight_and_loose_lists() {
        assert_eq!(html("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>");
        assert_eq!(
            html("- a\n\n- b"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>"
        );
    }

    #[test]
    fn ordered_list_start() {
        assert_eq!(html("3. c\n4. d"), "<ol start=\"3\">\n<li>c</li>\n<li>d</li>\n</ol>");
    }

    #[test]
    fn task_items() {
        assert_eq!(
            html("- [x] done\n- [ ] todo"),
            "<ul class=\"contains-task-list\">\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" checked disabled /> done</li>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" disabled /> todo</li>\n</ul>"
        );
    }

    #[test]
    fn code_blocks_and_math() {
        assert_eq!(
            html("```rust\nfn main() {}\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
        assert_eq!(
            html("$x^2$"),
            "<p><code class=\"language-math math-inline\">x^2</code></p>"
        );
        assert_eq!(
            html("$$\na+b\n$$"),
            "<pre><code class=\"language-math math-display\">a+b</code></pre>"
        );
    }

    #[test]
    fn tables_with_alignment() {
        assert_eq!(
            html("| a | b |\n|:--|--:|\n| 1 | 2 |"),
            "<table>\n<thead>\n<tr>\n<th align=\"left\">a</th>\n<th align=\"right\">b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td align=\"left\">1</td>\n<td align=\"right\">2</td>\n</tr>\n</tbody>\n</table>"
        );
    }

    #[test]
    fn image_hints_become_attributes() {
        let mut root = parse_markdown("![a](x.png)", &Default::default()).unwrap();
        let image = &mut root.children[0].children[0];
        image.data.merge_property("className", Some("mx-auto block".to_string()));
        image.data.merge_property("width", Some("300".to_string()));
        assert_eq!(
            to_html(&lower(&root)),
            "<p><img src=\"x.png\" alt=\"a\" class=\"mx-auto block\" width=\"300\" /></p>"
        );
    }

    #[test]
    fn raw_html_passes_through() {
        assert_eq!(html("a <kbd>Ctrl</kbd>"), "<p>a <kbd>Ctrl</kbd></p>");
    }

    #[test]
    fn references_resolve_against_definitions() {
        assert_eq!(
            html("[docs][d]\n\n[d]: https://example.com \"Docs\""),
            "<p><a href=\"https://example.com\" title=\"Docs\">docs</a></p>"
        );
    }

    #[test]
    fn footnotes_get_a_section() {
        let out = html("Note[^1].\n\n[^1]: Details.");
        assert!(out.starts_with(
            "<p>Note<sup><a href=\"#user-content-fn-1\" id=\"user-content-fnref-1\" data-footnote-ref aria-describedby=\"footnote-label\">1</a></sup>.</p>"
        ));
        assert!(out.contains("<section data-footnotes class=\"footnotes\">"));
        assert!(out.contains("<li id=\"user-content-fn-1\">"));
        assert!(out.contains("href=\"#user-content-fnref-1\""));
    }

    #[test]
    fn footnotes_referenced_from_definitions_are_listed() {
        let out = html("Footnote[^a]\n\n[^a]: see[^b]\n\n[^b]: inner");
        assert!(out.contains(
            "see<sup><a href=\"#user-content-fn-b\" id=\"user-content-fnref-b\" data-footnote-ref aria-describedby=\"footnote-label\">2</a></sup>"
        ));
        assert!(out.contains("<li id=\"user-content-fn-a\">"));
        assert!(out.contains("<li id=\"user-content-fn-b\">"));
        assert!(out.contains("<p>inner "));
        assert!(out.contains("aria-label=\"Back to reference 2\""));
    }

    #[test]
    fn uri_normalization() {
        assert_eq!(normalize_uri("a b/ü?x=1%20"), "a%20b/%C3%BC?x=1%20");
        assert_eq!(normalize_uri("100%"), "100%25");
    }

    #[test]
    fn trims_spaces_around_line_endings() {
        assert_eq!(trim_lines("a  \n  b"), "a\nb");
        assert_eq!(trim_lines("  lead"), "  lead");
    }
}
