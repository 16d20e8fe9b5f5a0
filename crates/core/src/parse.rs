//! Markdown parsing and the ordered chain of syntax tree transforms.

use crate::syntax::{Node, lift};
use crate::{DocError, SourceLocation};
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Allow raw HTML nodes in the AST.
    pub raw_html: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
}

impl ParseOptions {
    /// Documentation defaults: GFM, math and trusted raw HTML.
    pub const fn docs() -> Self {
        Self {
            gfm: true,
            raw_html: true,
            math: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            // Front matter is split off before parsing.
            frontmatter: false,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            // `~x~` is subscript, strikethrough needs `~~`.
            gfm_strikethrough_single_tilde: false,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::docs()
    }
}

/// A named, in-place rewrite of a parsed syntax tree.
pub trait AstTransform: Send + Sync {
    /// Short stage name used in logs and cancellation errors.
    fn name(&self) -> &'static str;

    /// Mutate the syntax tree in place.
    fn transform(&self, root: &mut Node);
}

/// Configurable parsing pipeline with an ordered list of tree transforms.
pub struct ParserPipeline {
    options: ParseOptions,
    ast_transforms: Vec<Box<dyn AstTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline from core parse options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ast_transforms: Vec::new(),
        }
    }

    /// Add an AST transform; transforms run in insertion order.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.ast_transforms.push(Box::new(transform));
    }

    /// Names of the registered transforms, in order.
    pub fn transform_names(&self) -> Vec<&'static str> {
        self.ast_transforms.iter().map(|t| t.name()).collect()
    }

    /// Parse markdown into a syntax tree and run every transform.
    pub fn parse(&self, input: &str) -> Result<Node, DocError> {
        self.parse_with_checkpoint(input, |_| Ok(()))
    }

    /// Like [`ParserPipeline::parse`], calling `checkpoint` with the stage
    /// name before parsing and before each transform. An error from the
    /// checkpoint aborts and discards the tree.
    pub fn parse_with_checkpoint<F>(&self, input: &str, mut checkpoint: F) -> Result<Node, DocError>
    where
        F: FnMut(&'static str) -> Result<(), DocError>,
    {
        checkpoint("parse")?;
        let mut root = parse_markdown(input, &self.options)?;

        for transform in &self.ast_transforms {
            checkpoint(transform.name())?;
            log::debug!("Running syntax transform '{}'", transform.name());
            transform.transform(&mut root);
        }

        Ok(root)
    }
}

/// Parse markdown into a syntax tree using core options.
pub fn parse_markdown(input: &str, options: &ParseOptions) -> Result<Node, DocError> {
    parse_markdown_with_options(input, &options.to_markdown())
}

fn parse_markdown_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, DocError> {
    let mdast = markdown::to_mdast(input, options).map_err(|err| DocError::Parse {
        message: err.to_string(),
        location: message_location(&err),
    })?;

    lift(mdast).ok_or_else(|| DocError::Internal("markdown parser returned no root".to_string()))
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NodeKind;

    struct Uppercase;

    impl AstTransform for Uppercase {
        fn name(&self) -> &'static str {
            "uppercase"
        }

        fn transform(&self, root: &mut Node) {
            crate::visit::walk(root, &mut |node: &mut Node, _: usize, _: &NodeKind| {
                if let NodeKind::Text { value } = &mut node.kind {
                    *value = value.to_uppercase();
                }
                crate::visit::Visit::Continue
            });
        }
    }

    fn texts(root: &Node) -> Vec<String> {
        root.descendants()
            .filter_map(Node::as_text)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn single_tilde_is_plain_text() {
        let root = parse_markdown("H~2~O and ~~gone~~", &ParseOptions::docs()).unwrap();
        let para = &root.children[0];
        assert_eq!(para.children[0].as_text(), Some("H~2~O and "));
        assert_eq!(para.children[1].kind, NodeKind::Delete);
    }

    #[test]
    fn math_spans_are_recognised() {
        let root = parse_markdown("Inline $x^2$ here.\n\n$$\na+b\n$$", &ParseOptions::docs()).unwrap();
        assert!(
            root.descendants()
                .any(|n| matches!(&n.kind, NodeKind::InlineMath { value } if value == "x^2"))
        );
        assert!(
            root.descendants()
                .any(|n| matches!(&n.kind, NodeKind::Math { value } if value == "a+b"))
        );
    }

    #[test]
    fn raw_html_toggle() {
        let with_html = parse_markdown("a <b>x</b>", &ParseOptions::docs()).unwrap();
        assert!(
            with_html
                .descendants()
                .any(|n| matches!(n.kind, NodeKind::Html { .. }))
        );

        let options = ParseOptions {
            raw_html: false,
            ..ParseOptions::docs()
        };
        let without = parse_markdown("a <b>x</b>", &options).unwrap();
        assert!(
            !without
                .descendants()
                .any(|n| matches!(n.kind, NodeKind::Html { .. }))
        );
    }

    #[test]
    fn pipeline_runs_transforms_in_order() {
        let mut pipeline = ParserPipeline::new(ParseOptions::docs());
        pipeline.add_ast_transform(Uppercase);
        assert_eq!(pipeline.transform_names(), vec!["uppercase"]);
        let root = pipeline.parse("hello *world*").unwrap();
        assert_eq!(texts(&root), vec!["HELLO ", "WORLD"]);
    }

    #[test]
    fn checkpoint_error_aborts() {
        let mut pipeline = ParserPipeline::new(ParseOptions::docs());
        pipeline.add_ast_transform(Uppercase);
        let result = pipeline.parse_with_checkpoint("text", |stage| {
            if stage == "uppercase" {
                Err(DocError::cancelled(stage))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(DocError::Cancelled { stage }) if stage == "uppercase"));
    }
}
