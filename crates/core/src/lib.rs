#![deny(missing_docs)]
//! docshelf core: front matter, the markdown syntax tree, slugs, and search.

/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction and the `Document` record.
pub mod frontmatter;
/// Markdown parsing and the syntax transform chain.
pub mod parse;
/// Full-text search over supplied documents.
pub mod search;
/// Slug generation utilities.
pub mod slug;
pub mod syntax;
pub mod text;
pub mod visit;

pub use error::{Diagnostics, DocError, SourceLocation, Warning};
pub use frontmatter::{Document, FrontmatterError, FrontmatterExtraction, Metadata, extract_frontmatter};
pub use parse::{AstTransform, ParseOptions, ParserPipeline, parse_markdown};
pub use search::{SearchHit, search};
pub use slug::{Slugger, slugify};
pub use syntax::{Align, Node, NodeData, NodeKind};
pub use visit::{InlineMatch, InlineScanner, TextRewriter, Visit, Visitor, walk};
