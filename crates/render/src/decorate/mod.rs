//! Decorators applied to the HTML tree after lowering, in pipeline order:
//! heading slugs, heading anchors, code highlighting, math.

mod anchor;
mod highlight;
mod math;
mod slug;

pub use anchor::HeadingAnchors;
pub use highlight::CodeHighlighter;
pub use math::MathRenderer;
pub use slug::HeadingSlugs;

use crate::hast::HtmlNode;
use crate::toc::HeadingEntry;
use docshelf_core::Diagnostics;

/// State shared by the decorators of one render.
#[derive(Debug, Default)]
pub struct DecorateContext {
    /// Recoverable problems found while decorating.
    pub diagnostics: Diagnostics,
    /// Headings that received an id, in document order.
    pub headings: Vec<HeadingEntry>,
}

/// A named, in-place rewrite of the HTML tree.
pub trait HtmlDecorator: Send + Sync {
    /// Short stage name used in logs and cancellation errors.
    fn name(&self) -> &'static str;

    /// Mutate the HTML tree in place.
    fn decorate(&self, tree: &mut [HtmlNode], context: &mut DecorateContext);
}
