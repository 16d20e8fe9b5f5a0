//! Syntax tree rewriters for the custom inline syntax and the structural
//! text extensions.
//!
//! Each rewriter is an [`AstTransform`](docshelf_core::AstTransform) that the
//! pipeline registers in a fixed order.

mod breaks;
mod emoji;
mod image;
mod mark;
mod sub_super;

pub use breaks::HardBreaks;
pub use emoji::EmojiShortcodes;
pub use image::ImageDirectives;
pub use mark::MarkedText;
pub use sub_super::SubSuperscript;
