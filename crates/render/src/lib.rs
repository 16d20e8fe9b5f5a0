#![deny(missing_docs)]
//! docshelf rendering: markdown documents to HTML fragments with heading
//! metadata, single or in parallel batches.

/// Parallel rendering of many documents.
pub mod batch;
/// HTML tree decorators (heading ids, anchors, highlighting, math).
pub mod decorate;
/// HTML tree, lowering and serialization.
pub mod hast;
/// Render configuration.
pub mod options;
/// The staged render pipeline and cancellation.
pub mod pipeline;
/// Syntax tree rewriters for the custom inline syntax.
pub mod rewrite;
/// Heading outline and table of contents insertion.
pub mod toc;

pub use batch::{BatchInput, BatchOptions, BatchOutcome, BatchResult, BatchStats, render_batch};
pub use options::{MAX_TOC_DEPTH, RenderOptions};
pub use pipeline::{
    CancellationToken, RenderPipeline, RenderedDocument, render_bytes, render_document,
    render_document_with_cancel,
};
pub use toc::{HeadingEntry, TableOfContents, outline};
