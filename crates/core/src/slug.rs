use std::collections::HashMap;

/// Generates unique heading slugs with github-slugger's collision rules.
///
/// Every slug handed out is remembered; a repeat of an earlier slug gets the
/// lowest numeric suffix (`-1`, `-2`, ...) that is still free, so a literal
/// heading such as "Setup 1" cannot collide with a deduplicated "Setup".
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next slug for the given heading text.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut candidate = base.clone();

        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.occurrences.insert(candidate.clone(), 0);

        candidate
    }

    /// Forgets every slug handed out so far.
    pub fn reset(&mut self) {
        self.occurrences.clear();
    }
}

/// Converts heading text into a URL fragment without deduplication.
///
/// 1. Lowercase
/// 2. Drop everything that is not a letter, digit, combining mark, `-`, `_` or whitespace
/// 3. Replace each whitespace character with a hyphen (no collapsing or trimming)
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch.is_whitespace() {
            slug.push('-');
        } else if ch == '-' || ch == '_' || ch.is_alphanumeric() || is_combining_mark(ch) {
            slug.extend(ch.to_lowercase());
        }
    }

    slug
}

/// Combining marks (virama, nukta, diacritics) are kept so Indic, Arabic and
/// Thai headings do not lose letters.
fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x0483..=0x0489
            | 0x0591..=0x05C7
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0670
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0951..=0x0957
            | 0x0962..=0x0963
            | 0x0981..=0x0983
            | 0x09BC..=0x09D7
            | 0x0A01..=0x0A4D
            | 0x0A81..=0x0ACD
            | 0x0B01..=0x0BCD
            | 0x0E31
            | 0x0E34..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0x3099..=0x309A
            | 0xFE20..=0xFE2F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn duplicates_get_numeric_suffix() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Setup"), "setup");
        assert_eq!(slugger.slug("Setup"), "setup-1");
        assert_eq!(slugger.slug("Setup"), "setup-2");
    }

    #[test]
    fn suffix_skips_slugs_already_taken() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Setup 1"), "setup-1");
        assert_eq!(slugger.slug("Setup"), "setup");
        assert_eq!(slugger.slug("Setup"), "setup-2");
    }

    #[test]
    fn reset_forgets_history() {
        let mut slugger = Slugger::new();
        slugger.slug("Intro");
        slugger.reset();
        assert_eq!(slugger.slug("Intro"), "intro");
    }

    #[test]
    fn punctuation_is_dropped() {
        let cases = [
            ("import.meta.glob", "importmetaglob"),
            ("<Image />", "image-"),
            ("Why Rust?", "why-rust"),
            ("TypeScript & JSX", "typescript--jsx"),
            ("getStaticPaths()", "getstaticpaths"),
            ("Using __dirname", "using-__dirname"),
            ("  a---b  ", "--a---b--"),
            ("Hello\tWorld", "hello-world"),
            ("Foo\nbar", "foo-bar"),
        ];
        for (input, expected) in cases {
            assert_eq!(slugify(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn unicode_letters_and_marks_preserved() {
        assert_eq!(slugify("多言語 ガイド"), "多言語-ガイド");
        assert_eq!(slugify("Héllo Wörld"), "héllo-wörld");
        assert_eq!(slugify("डिफ़ॉल्ट रूप"), "डिफ़ॉल्ट-रूप");
        assert_eq!(slugify("🚀 Getting Started"), "-getting-started");
    }

    #[test]
    fn empty_text_gives_empty_slug() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("!!!"), "");
        assert_eq!(slugger.slug("???"), "-1");
    }
}
