//! Render configuration, built once per render call.

use docshelf_core::ParseOptions;
use serde::{Deserialize, Serialize};

/// Deepest heading level a table of contents can list.
pub const MAX_TOC_DEPTH: u8 = 6;

/// Options controlling one document render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Deepest heading level listed in the table of contents (1-6).
    #[serde(default = "default_toc_max_depth")]
    pub toc_max_depth: u8,
    /// Heading text that marks where the table of contents goes.
    #[serde(default = "default_toc_heading_title")]
    pub toc_heading_title: String,
    /// Whether the table of contents is an ordered list.
    #[serde(default = "default_true")]
    pub toc_ordered: bool,
    /// Whether table of contents items are rendered without paragraphs.
    #[serde(default = "default_true")]
    pub toc_tight: bool,
    /// Prefix added to every generated heading id and TOC link.
    #[serde(default)]
    pub id_prefix: String,
    /// Whether a self-link is appended to each heading.
    #[serde(default = "default_true")]
    pub heading_anchors: bool,
    /// Text inside the heading self-link.
    #[serde(default = "default_anchor_symbol")]
    pub anchor_symbol: String,
    /// Wrap lines of code blocks in an unknown language even though they
    /// cannot be tokenized.
    #[serde(default)]
    pub highlight_unknown_language: bool,
    /// Annotate highlighted code lines with line numbers.
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    /// Recognise and render `$…$` / `$$…$$` math.
    #[serde(default = "default_true")]
    pub math: bool,
    /// Replace `:shortcode:` emoji.
    #[serde(default = "default_true")]
    pub emoji: bool,
    /// Turn every line ending inside a paragraph into `<br />`.
    #[serde(default = "default_true")]
    pub hard_breaks: bool,
    /// Pass raw HTML from documents through. Documents are trusted content.
    #[serde(default = "default_true")]
    pub raw_html: bool,
}

fn default_toc_max_depth() -> u8 {
    MAX_TOC_DEPTH
}

fn default_toc_heading_title() -> String {
    "Table of Contents".to_string()
}

fn default_anchor_symbol() -> String {
    " #".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            toc_max_depth: default_toc_max_depth(),
            toc_heading_title: default_toc_heading_title(),
            toc_ordered: true,
            toc_tight: true,
            id_prefix: String::new(),
            heading_anchors: true,
            anchor_symbol: default_anchor_symbol(),
            highlight_unknown_language: false,
            line_numbers: true,
            math: true,
            emoji: true,
            hard_breaks: true,
            raw_html: true,
        }
    }
}

impl RenderOptions {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the TOC depth clamped to 1-6.
    pub fn effective_toc_depth(&self) -> u8 {
        let clamped = self.toc_max_depth.clamp(1, MAX_TOC_DEPTH);
        if clamped != self.toc_max_depth {
            log::warn!(
                "tocMaxDepth {} out of range, using {}",
                self.toc_max_depth,
                clamped
            );
        }
        clamped
    }

    /// Parser constructs implied by these options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: true,
            raw_html: self.raw_html,
            math: self.math,
        }
    }
}
