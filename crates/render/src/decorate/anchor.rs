use super::{DecorateContext, HtmlDecorator};
use crate::hast::{Element, HtmlNode, walk_mut};

/// Appends a self-link to every heading that has an id.
#[derive(Debug, Clone)]
pub struct HeadingAnchors {
    symbol: String,
}

impl HeadingAnchors {
    /// `symbol` is the visible link text, escaped on output.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    fn anchor(&self, id: &str) -> HtmlNode {
        let icon = Element::new("span")
            .with_attr("class", "anchor-icon")
            .with_children(vec![HtmlNode::text(self.symbol.clone())]);
        Element::new("a")
            .with_attr("class", "anchor")
            .with_attr("href", format!("#{id}"))
            .with_children(vec![icon.into()])
            .into()
    }
}

impl HtmlDecorator for HeadingAnchors {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn decorate(&self, tree: &mut [HtmlNode], _context: &mut DecorateContext) {
        walk_mut(tree, &mut |node: &mut HtmlNode| {
            let Some(heading) = node.as_element_mut() else {
                return false;
            };
            if heading.heading_depth().is_none() {
                return true;
            }
            if let Some(id) = heading.attr("id").map(str::to_string) {
                heading.children.push(self.anchor(&id));
            }
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::serialize::to_html;

    #[test]
    fn appends_link_after_content() {
        let mut tree = vec![
            Element::new("h2")
                .with_attr("id", "usage")
                .with_children(vec![HtmlNode::text("Usage")])
                .into(),
            Element::new("h3")
                .with_children(vec![HtmlNode::text("No id")])
                .into(),
        ];
        HeadingAnchors::new(" #").decorate(&mut tree, &mut DecorateContext::default());
        assert_eq!(
            to_html(&tree),
            "<h2 id=\"usage\">Usage<a class=\"anchor\" href=\"#usage\"><span class=\"anchor-icon\"> #</span></a></h2><h3>No id</h3>"
        );
    }
}
