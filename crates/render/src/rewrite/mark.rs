//! `==highlight==` spans.

use docshelf_core::{AstTransform, InlineMatch, InlineScanner, Node, TextRewriter};

const DELIMITER: &str = "==";

/// Rewrites `==text==` into `<mark>text</mark>`.
///
/// Pairing is non-greedy and left to right: `==a==b==` marks `a` and leaves
/// `b==` literal. Content must be non-empty and stay on one line.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkedText;

impl InlineScanner for MarkedText {
    fn scan(&self, value: &str) -> Vec<InlineMatch> {
        let mut matches = Vec::new();
        let mut cursor = 0;

        while let Some(found) = value[cursor..].find(DELIMITER) {
            let open = cursor + found;
            let content_start = open + DELIMITER.len();

            match find_close(value, content_start) {
                Some(close) => {
                    let content = &value[content_start..close];
                    matches.push(InlineMatch {
                        start: open,
                        end: close + DELIMITER.len(),
                        html: format!("<mark>{}</mark>", html_escape::encode_text(content)),
                    });
                    cursor = close + DELIMITER.len();
                }
                // `=` is one byte, so open + 1 is a char boundary.
                None => cursor = open + 1,
            }
        }

        matches
    }
}

fn find_close(value: &str, content_start: usize) -> Option<usize> {
    let first = value[content_start..].chars().next()?;
    if first == '\n' {
        return None;
    }
    let search_from = content_start + first.len_utf8();
    let close = search_from + value[search_from..].find(DELIMITER)?;
    if value[content_start..close].contains('\n') {
        return None;
    }
    Some(close)
}

impl AstTransform for MarkedText {
    fn name(&self) -> &'static str {
        "marked-text"
    }

    fn transform(&self, root: &mut Node) {
        TextRewriter::new(*self).apply(root);
    }
}
