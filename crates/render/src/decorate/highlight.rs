//! Class-based syntax highlighting of fenced code with syntect.
//!
//! Each source line becomes `<span class="code-line line-number" line="N">`.
//! Token spans carry the scope names as classes (`source rust`, `keyword
//! control`, ...) and are closed at the end of every line and reopened on the
//! next, so line wrappers always nest cleanly.

use super::{DecorateContext, HtmlDecorator};
use crate::hast::{Element, HtmlNode, text_content, walk_mut};
use docshelf_core::{Diagnostics, Warning};
use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, line_tokens_to_classed_spans};
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(|| {
    log::debug!("Loading syntect syntax set");
    SyntaxSet::load_defaults_newlines()
});

/// Highlights `pre > code.language-*` blocks.
#[derive(Debug, Clone)]
pub struct CodeHighlighter {
    line_numbers: bool,
    highlight_unknown: bool,
}

impl CodeHighlighter {
    /// `highlight_unknown` wraps lines of blocks whose language is unknown or
    /// missing; otherwise those blocks are left alone.
    pub fn new(line_numbers: bool, highlight_unknown: bool) -> Self {
        Self {
            line_numbers,
            highlight_unknown,
        }
    }

    fn highlight_block(&self, pre: &mut Element, diagnostics: &mut Diagnostics) {
        let Some(code) = pre
            .children
            .iter_mut()
            .find_map(HtmlNode::as_element_mut)
            .filter(|code| code.tag == "code")
        else {
            return;
        };
        if code.has_class("language-math") {
            return;
        }

        let lang = code
            .classes()
            .find_map(|class| class.strip_prefix("language-"))
            .map(str::to_string);
        let source = text_content(&code.children);

        let html = match lang.as_deref().and_then(find_syntax) {
            Some(syntax) => match self.highlight(&source, syntax) {
                Ok(html) => html,
                Err(err) => {
                    diagnostics.add_warning(Warning::Highlight {
                        lang: lang.unwrap_or_default(),
                        message: err.to_string(),
                    });
                    return;
                }
            },
            None if self.highlight_unknown => self.plain(&source),
            None => {
                log::debug!("No syntax for code block language {:?}", lang);
                return;
            }
        };

        code.add_class("code-highlight");
        code.children = vec![HtmlNode::Raw(html)];
        if let Some(lang) = lang {
            pre.add_class(&format!("language-{lang}"));
        }
    }

    fn highlight(&self, source: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut out = String::with_capacity(source.len() * 2);

        for (index, line) in LinesWithEndings::from(source).enumerate() {
            let reopened = stack.as_slice().len();
            let mut prefix = String::new();
            for scope in stack.as_slice() {
                prefix.push_str("<span class=\"");
                prefix.push_str(&scope.build_string().replace('.', " "));
                prefix.push_str("\">");
            }

            let ops = state.parse_line(line, &SYNTAX_SET)?;
            let (body, delta) = line_tokens_to_classed_spans(line, &ops, ClassStyle::Spaced, &mut stack)?;
            let open = (reopened as isize + delta).max(0) as usize;

            out.push_str(&self.line_open(index + 1));
            out.push_str(&prefix);
            out.push_str(&body);
            out.push_str(&"</span>".repeat(open));
            out.push_str("</span>");
        }

        Ok(out)
    }

    fn plain(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + 64);
        for (index, line) in LinesWithEndings::from(source).enumerate() {
            out.push_str(&self.line_open(index + 1));
            out.push_str(&html_escape::encode_text(line));
            out.push_str("</span>");
        }
        out
    }

    fn line_open(&self, number: usize) -> String {
        if self.line_numbers {
            format!("<span class=\"code-line line-number\" line=\"{number}\">")
        } else {
            "<span class=\"code-line\">".to_string()
        }
    }
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    if lang.is_empty() {
        return None;
    }
    let set: &'static SyntaxSet = &SYNTAX_SET;
    set.find_syntax_by_token(lang).or_else(|| {
        let lower = lang.to_lowercase();
        set.syntaxes()
            .iter()
            .find(|syntax| syntax.name.to_lowercase() == lower)
    })
}

impl HtmlDecorator for CodeHighlighter {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn decorate(&self, tree: &mut [HtmlNode], context: &mut DecorateContext) {
        walk_mut(tree, &mut |node: &mut HtmlNode| {
            let Some(element) = node.as_element_mut() else {
                return false;
            };
            if element.tag != "pre" {
                return true;
            }
            self.highlight_block(element, &mut context.diagnostics);
            false
        });
    }
}
