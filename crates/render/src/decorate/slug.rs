use super::{DecorateContext, HtmlDecorator};
use crate::hast::{HtmlNode, text_content, walk_mut};
use crate::toc::HeadingEntry;
use docshelf_core::Slugger;

/// Gives every heading without an id a unique slug id.
#[derive(Debug, Clone, Default)]
pub struct HeadingSlugs {
    id_prefix: String,
}

impl HeadingSlugs {
    /// Ids are `id_prefix` followed by the slug.
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
        }
    }
}

impl HtmlDecorator for HeadingSlugs {
    fn name(&self) -> &'static str {
        "slug"
    }

    fn decorate(&self, tree: &mut [HtmlNode], context: &mut DecorateContext) {
        let mut slugger = Slugger::new();
        walk_mut(tree, &mut |node: &mut HtmlNode| {
            let Some(heading) = node.as_element_mut() else {
                return false;
            };
            let Some(depth) = heading.heading_depth() else {
                return true;
            };
            if heading.has_attr("id") {
                return false;
            }

            let text = text_content(&heading.children);
            let slug = slugger.slug(&text);
            heading.set_attr("id", format!("{}{}", self.id_prefix, slug));
            context.headings.push(HeadingEntry {
                depth,
                slug,
                text: text.trim().to_string(),
            });
            false
        });
    }
}
