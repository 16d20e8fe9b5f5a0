//! `~sub~` and `^sup^` spans.
//!
//! After a sigil (`~` for subscript, `^` for superscript) the scanner accepts,
//! in order of preference:
//!
//! - `{...}`: a brace group, content up to the first `}`;
//! - `(...)`: a parenthesis group, content up to the first `)`;
//! - a run of non-space, non-sigil characters closed by the same sigil
//!   (`H~2~O`);
//! - a single non-space, non-sigil character with no closer (`x^2`).
//!
//! Group content must be non-empty and on one line.

use docshelf_core::{AstTransform, InlineMatch, InlineScanner, Node, TextRewriter};

/// Rewrites subscript and superscript sigils into `<sub>` / `<sup>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubSuperscript;

fn tag_for(sigil: char) -> Option<&'static str> {
    match sigil {
        '~' => Some("sub"),
        '^' => Some("sup"),
        _ => None,
    }
}

fn is_sigil(ch: char) -> bool {
    ch == '~' || ch == '^'
}

fn is_run_char(ch: char) -> bool {
    !ch.is_whitespace() && !is_sigil(ch)
}

impl InlineScanner for SubSuperscript {
    fn scan(&self, value: &str) -> Vec<InlineMatch> {
        let mut matches = Vec::new();
        let mut cursor = 0;

        while let Some(found) = value[cursor..].find(is_sigil) {
            let start = cursor + found;
            // Both sigils are ASCII.
            let sigil = char::from(value.as_bytes()[start]);
            let after = start + 1;

            match match_after_sigil(value, after, sigil) {
                Some((content, end)) => {
                    let tag = tag_for(sigil).unwrap_or("sub");
                    matches.push(InlineMatch {
                        start,
                        end,
                        html: format!("<{tag}>{}</{tag}>", html_escape::encode_text(content)),
                    });
                    cursor = end;
                }
                None => cursor = after,
            }
        }

        matches
    }
}

/// Returns the captured content and the end offset of the construct.
fn match_after_sigil(value: &str, after: usize, sigil: char) -> Option<(&str, usize)> {
    let rest = &value[after..];
    let first = rest.chars().next()?;

    let group = match first {
        '{' => match_group(value, after, '}'),
        '(' => match_group(value, after, ')'),
        _ => None,
    };
    if group.is_some() {
        return group;
    }

    if !is_run_char(first) {
        return None;
    }

    let run_len: usize = rest
        .chars()
        .take_while(|ch| is_run_char(*ch))
        .map(char::len_utf8)
        .sum();
    if rest[run_len..].starts_with(sigil) {
        return Some((&rest[..run_len], after + run_len + sigil.len_utf8()));
    }

    let single = first.len_utf8();
    Some((&rest[..single], after + single))
}

/// Matches `open content close` starting at `at`, non-greedy.
fn match_group(value: &str, at: usize, close: char) -> Option<(&str, usize)> {
    let content_start = at + 1;
    let first = value[content_start..].chars().next()?;
    if first == '\n' {
        return None;
    }
    let search_from = content_start + first.len_utf8();
    let close_at = search_from + value[search_from..].find(close)?;
    let content = &value[content_start..close_at];
    if content.contains('\n') {
        return None;
    }
    Some((content, close_at + close.len_utf8()))
}

impl AstTransform for SubSuperscript {
    fn name(&self) -> &'static str {
        "sub-super"
    }

    fn transform(&self, root: &mut Node) {
        TextRewriter::new(*self).apply(root);
    }
}
