//! Document rendering: front matter, parsing, syntax transforms, lowering,
//! decorators and serialization, run strictly in that order.

use crate::decorate::{
    CodeHighlighter, DecorateContext, HeadingAnchors, HeadingSlugs, HtmlDecorator, MathRenderer,
};
use crate::hast::{lower::lower, serialize::to_html};
use crate::options::RenderOptions;
use crate::rewrite::{EmojiShortcodes, HardBreaks, ImageDirectives, MarkedText, SubSuperscript};
use crate::toc::{HeadingEntry, TableOfContents};
use docshelf_core::{Diagnostics, DocError, Document, Metadata, ParserPipeline, Warning};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Output of one successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    /// Serialized HTML fragment.
    pub html: String,
    /// Front matter mapping, empty when absent or unusable.
    pub metadata: Metadata,
    /// Headings that received an id, in document order.
    pub headings: Vec<HeadingEntry>,
    /// Recoverable problems encountered during the render.
    pub diagnostics: Diagnostics,
}

/// Cooperative cancellation signal, checked between stages.
///
/// Clones share the same flag, so one handle can cancel a render running on
/// another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// A token that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also counts as cancelled once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn checkpoint(&self, stage: &str) -> Result<(), DocError> {
        if self.is_cancelled() {
            log::debug!("Render cancelled before stage '{}'", stage);
            return Err(DocError::cancelled(stage));
        }
        Ok(())
    }
}

/// The configured stage list for one set of options.
///
/// Building it once and reusing it across documents is safe: stages hold only
/// configuration, every render works on its own trees.
pub struct RenderPipeline {
    parser: ParserPipeline,
    decorators: Vec<Box<dyn HtmlDecorator>>,
}

impl RenderPipeline {
    /// Registers every stage enabled by `options`.
    pub fn new(options: &RenderOptions) -> Self {
        let mut parser = ParserPipeline::new(options.parse_options());
        if options.emoji {
            parser.add_ast_transform(EmojiShortcodes);
        }
        if options.hard_breaks {
            parser.add_ast_transform(HardBreaks);
        }
        parser.add_ast_transform(ImageDirectives);
        parser.add_ast_transform(MarkedText);
        parser.add_ast_transform(SubSuperscript);
        parser.add_ast_transform(TableOfContents::new(options));

        let mut decorators: Vec<Box<dyn HtmlDecorator>> =
            vec![Box::new(HeadingSlugs::new(options.id_prefix.clone()))];
        if options.heading_anchors {
            decorators.push(Box::new(HeadingAnchors::new(options.anchor_symbol.clone())));
        }
        decorators.push(Box::new(CodeHighlighter::new(
            options.line_numbers,
            options.highlight_unknown_language,
        )));
        if options.math {
            decorators.push(Box::new(MathRenderer));
        }

        Self { parser, decorators }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = vec!["frontmatter", "parse"];
        names.extend(self.parser.transform_names());
        names.push("lower");
        names.extend(self.decorators.iter().map(|decorator| decorator.name()));
        names.push("serialize");
        names
    }

    /// Renders one document, honouring `token` between stages.
    pub fn render(
        &self,
        raw: &str,
        token: &CancellationToken,
    ) -> Result<RenderedDocument, DocError> {
        let mut diagnostics = Diagnostics::new();

        token.checkpoint("frontmatter")?;
        let (document, frontmatter_error) = Document::from_source(raw);
        if let Some(err) = frontmatter_error {
            diagnostics.add_warning(Warning::Frontmatter {
                message: err.to_string(),
            });
        }

        let root = self
            .parser
            .parse_with_checkpoint(&document.body, |stage| token.checkpoint(stage))?;

        token.checkpoint("lower")?;
        let mut tree = lower(&root);
        drop(root);

        let mut context = DecorateContext::default();
        for decorator in &self.decorators {
            token.checkpoint(decorator.name())?;
            log::debug!("Running HTML decorator '{}'", decorator.name());
            decorator.decorate(&mut tree, &mut context);
        }

        token.checkpoint("serialize")?;
        let html = to_html(&tree);
        diagnostics.extend(context.diagnostics);

        Ok(RenderedDocument {
            html,
            metadata: document.metadata,
            headings: context.headings,
            diagnostics,
        })
    }
}

/// Renders raw document text to HTML.
pub fn render_document(raw: &str, options: &RenderOptions) -> Result<RenderedDocument, DocError> {
    render_document_with_cancel(raw, options, &CancellationToken::new())
}

/// Like [`render_document`], giving up between stages once `token` is
/// cancelled. A cancelled render returns [`DocError::Cancelled`] and no HTML.
pub fn render_document_with_cancel(
    raw: &str,
    options: &RenderOptions,
    token: &CancellationToken,
) -> Result<RenderedDocument, DocError> {
    RenderPipeline::new(options).render(raw, token)
}

/// Renders a document given as bytes; invalid UTF-8 is malformed input.
pub fn render_bytes(bytes: &[u8], options: &RenderOptions) -> Result<RenderedDocument, DocError> {
    let raw = std::str::from_utf8(bytes)?;
    render_document(raw, options)
}
