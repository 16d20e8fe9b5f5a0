//! TeX to MathML.

use super::{DecorateContext, HtmlDecorator};
use crate::hast::{Element, HtmlNode, text_content, walk_mut};
use docshelf_core::{Diagnostics, Warning};
use latex2mathml::{DisplayStyle, latex_to_mathml};

/// Replaces `code.math-inline` and `pre > code.math-display` with MathML.
///
/// Malformed TeX leaves the code element as it was and records a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathRenderer;

enum MathKind {
    Inline,
    Display,
}

fn math_kind(element: &Element) -> Option<MathKind> {
    match element.tag.as_str() {
        "code" if element.has_class("math-inline") => Some(MathKind::Inline),
        "pre" => element
            .children
            .iter()
            .filter_map(HtmlNode::as_element)
            .any(|code| code.tag == "code" && code.has_class("math-display"))
            .then_some(MathKind::Display),
        _ => None,
    }
}

fn render(element: &Element, kind: &MathKind, diagnostics: &mut Diagnostics) -> Option<HtmlNode> {
    let source = text_content(&element.children);
    let (style, tag, class) = match kind {
        MathKind::Inline => (DisplayStyle::Inline, "span", "math math-inline"),
        MathKind::Display => (DisplayStyle::Block, "div", "math math-display"),
    };

    match latex_to_mathml(source.trim(), style) {
        Ok(mathml) => Some(
            Element::new(tag)
                .with_attr("class", class)
                .with_children(vec![HtmlNode::Raw(mathml)])
                .into(),
        ),
        Err(err) => {
            diagnostics.add_warning(Warning::Math {
                source,
                message: err.to_string(),
            });
            None
        }
    }
}

impl HtmlDecorator for MathRenderer {
    fn name(&self) -> &'static str {
        "math"
    }

    fn decorate(&self, tree: &mut [HtmlNode], context: &mut DecorateContext) {
        walk_mut(tree, &mut |node: &mut HtmlNode| {
            let Some(element) = node.as_element() else {
                return false;
            };
            let Some(kind) = math_kind(element) else {
                return true;
            };
            if let Some(rendered) = render(element, &kind, &mut context.diagnostics) {
                *node = rendered;
            }
            false
        });
    }
}
