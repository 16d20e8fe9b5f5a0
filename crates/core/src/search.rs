//! Case-insensitive full-text search over already-read documents.

use crate::frontmatter::Document;
use crate::text::floor_char_boundary;
use serde::Serialize;

/// Characters of context kept on each side of the first body match.
const EXCERPT_RADIUS: usize = 100;
/// Length of the excerpt used when only the title matched.
const TITLE_ONLY_EXCERPT: usize = 200;

/// A document that matched a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Path of the document as supplied by the caller.
    pub path: String,
    /// Front matter `title`, or the file stem.
    pub title: String,
    /// Body text around the first match, suffixed with `...`.
    pub excerpt: String,
}

/// Searches `(path, raw source)` pairs for `query`.
///
/// A document matches when its title or markdown body contains the query,
/// ignoring case. Results keep the input order.
pub fn search<'a, I>(documents: I, query: &str) -> Vec<SearchHit>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    documents
        .into_iter()
        .filter_map(|(path, source)| search_document(path, source, &needle))
        .collect()
}

fn search_document(path: &str, source: &str, needle: &str) -> Option<SearchHit> {
    let (doc, _) = Document::from_source(source);
    let title = doc
        .meta_str("title")
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(path).to_string());

    let body_match = find_case_insensitive(&doc.body, needle);
    if body_match.is_none() && !title.to_lowercase().contains(needle) {
        return None;
    }

    let excerpt = match body_match {
        Some((start, end)) => {
            let from = start.saturating_sub(char_span_back(&doc.body, start, EXCERPT_RADIUS));
            let to = end + char_span_forward(&doc.body, end, EXCERPT_RADIUS);
            format!("{}...", doc.body[from..to].trim())
        }
        None => {
            let to = char_span_forward(&doc.body, 0, TITLE_ONLY_EXCERPT);
            format!("{}...", doc.body[..to].trim())
        }
    };

    Some(SearchHit {
        path: path.to_string(),
        title,
        excerpt,
    })
}

/// Finds the byte range of the first case-insensitive occurrence of `needle`
/// (already lowercased) in `haystack`.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let mut lowered = String::with_capacity(haystack.len());
    // Maps each byte offset of `lowered` back to the start of its source char.
    let mut origin = Vec::with_capacity(haystack.len() + 1);
    for (offset, ch) in haystack.char_indices() {
        for lower in ch.to_lowercase() {
            let before = lowered.len();
            lowered.push(lower);
            origin.extend(std::iter::repeat_n(offset, lowered.len() - before));
        }
    }
    origin.push(haystack.len());

    let found = lowered.find(needle)?;
    let start = origin[found];
    let last = origin[found + needle.len() - 1];
    let end = last + haystack[last..].chars().next().map_or(0, char::len_utf8);
    Some((start, end))
}

/// Byte length of up to `count` characters ending at `at`.
fn char_span_back(s: &str, at: usize, count: usize) -> usize {
    s[..at]
        .chars()
        .rev()
        .take(count)
        .map(char::len_utf8)
        .sum()
}

/// Byte length of up to `count` characters starting at `at`.
fn char_span_forward(s: &str, at: usize, count: usize) -> usize {
    let span: usize = s[at..].chars().take(count).map(char::len_utf8).sum();
    floor_char_boundary(&s[at..], span)
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}
