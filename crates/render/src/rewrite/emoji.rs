//! `:shortcode:` emoji substitution.

use docshelf_core::{AstTransform, Node, NodeKind, Visit, walk};

fn is_shortcode_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '+' | '-')
}

/// Replaces every known shortcode in `value`, or returns `None` when there
/// is nothing to replace.
fn replace_shortcodes(value: &str) -> Option<String> {
    let mut out = String::new();
    let mut last = 0;
    let mut cursor = 0;

    while let Some(found) = value[cursor..].find(':') {
        let open = cursor + found;
        let body_start = open + 1;
        let body_len = value[body_start..]
            .find(|ch: char| !is_shortcode_char(ch))
            .unwrap_or(value.len() - body_start);
        let close = body_start + body_len;

        if body_len == 0 || !value[close..].starts_with(':') {
            cursor = body_start;
            continue;
        }

        match emojis::get_by_shortcode(&value[body_start..close]) {
            Some(emoji) => {
                out.push_str(&value[last..open]);
                out.push_str(emoji.as_str());
                last = close + 1;
                cursor = close + 1;
            }
            // The closing colon may open the next shortcode.
            None => cursor = close,
        }
    }

    if last == 0 {
        return None;
    }
    out.push_str(&value[last..]);
    Some(out)
}

/// Substitutes known emoji shortcodes inside text nodes.
///
/// Text nodes are rewritten in place rather than split, so later inline
/// rewriters still see one contiguous value.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmojiShortcodes;

impl AstTransform for EmojiShortcodes {
    fn name(&self) -> &'static str {
        "emoji"
    }

    fn transform(&self, root: &mut Node) {
        walk(root, &mut |node: &mut Node, _: usize, _: &NodeKind| {
            if let NodeKind::Text { value } = &mut node.kind {
                if let Some(replaced) = replace_shortcodes(value) {
                    *value = replaced;
                }
                return Visit::SkipChildren;
            }
            Visit::Continue
        });
    }
}
