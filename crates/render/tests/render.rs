use docshelf_core::{DocError, Warning};
use docshelf_render::{
    BatchInput, BatchOptions, CancellationToken, HeadingEntry, RenderOptions, render_batch,
    render_bytes, render_document, render_document_with_cancel,
};

fn html(markdown: &str) -> String {
    render_document(markdown, &RenderOptions::default())
        .unwrap()
        .html
}

fn entry(depth: u8, slug: &str, text: &str) -> HeadingEntry {
    HeadingEntry {
        depth,
        slug: slug.to_string(),
        text: text.to_string(),
    }
}

#[test]
fn subscript_and_superscript() {
    insta::assert_snapshot!(html("H~2~O"), @"<p>H<sub>2</sub>O</p>");
    insta::assert_snapshot!(html("x^{10}"), @"<p>x<sup>10</sup></p>");
}

#[test]
fn marked_text() {
    insta::assert_snapshot!(html("==bold=="), @"<p><mark>bold</mark></p>");
}

#[test]
fn image_directives_become_attributes() {
    insta::assert_snapshot!(
        html("![a](image.png=300x200)"),
        @r#"<p><img src="image.png" alt="a" height="200" width="300" /></p>"#
    );
    insta::assert_snapshot!(
        html("![a](image.png#pic_center)"),
        @r#"<p><img src="image.png" alt="a" class="mx-auto block" /></p>"#
    );
}

#[test]
fn duplicate_headings_get_unique_ids_and_anchors() {
    let rendered = render_document("# Setup\n\n# Setup", &RenderOptions::default()).unwrap();
    insta::assert_snapshot!(rendered.html, @r##"
    <h1 id="setup">Setup<a class="anchor" href="#setup"><span class="anchor-icon"> #</span></a></h1>
    <h1 id="setup-1">Setup<a class="anchor" href="#setup-1"><span class="anchor-icon"> #</span></a></h1>
    "##);
    assert_eq!(
        rendered.headings,
        vec![entry(1, "setup", "Setup"), entry(1, "setup-1", "Setup")]
    );
}

#[test]
fn id_prefix_applies_to_ids_and_anchors_but_not_slugs() {
    let options = RenderOptions {
        id_prefix: "user-content-".to_string(),
        ..Default::default()
    };
    let rendered = render_document("## Usage", &options).unwrap();
    assert!(rendered.html.starts_with("<h2 id=\"user-content-usage\">Usage"));
    assert!(rendered.html.contains("href=\"#user-content-usage\""));
    assert_eq!(rendered.headings, vec![entry(2, "usage", "Usage")]);
}

#[test]
fn unknown_language_code_is_left_plain() {
    assert_eq!(
        html("```no-such-lang\na < b\n```"),
        "<pre><code class=\"language-no-such-lang\">a &lt; b\n</code></pre>"
    );
}

#[test]
fn known_language_code_is_highlighted() {
    let out = html("```rust\nfn main() {}\n```");
    assert!(out.starts_with("<pre class=\"language-rust\"><code class=\"language-rust code-highlight\">"));
    assert!(out.contains("<span class=\"code-line line-number\" line=\"1\">"));
    assert_eq!(out.matches("<span").count(), out.matches("</span>").count());
}

#[test]
fn front_matter_becomes_metadata() {
    let rendered = render_document("---\ntitle: X\n---\nbody", &RenderOptions::default()).unwrap();
    assert_eq!(rendered.html, "<p>body</p>");
    assert_eq!(rendered.metadata["title"], "X");
    assert!(!rendered.diagnostics.has_warnings());
}

#[test]
fn line_endings_become_breaks() {
    assert_eq!(html("a\nb"), "<p>a<br />\nb</p>");

    let options = RenderOptions::from_json(r#"{"hardBreaks": false}"#).unwrap();
    let rendered = render_document("a\nb", &options).unwrap();
    assert_eq!(rendered.html, "<p>a\nb</p>");
}

#[test]
fn emoji_shortcodes() {
    insta::assert_snapshot!(html("hi :smile: :not-an-emoji:"), @"<p>hi 😄 :not-an-emoji:</p>");
}

#[test]
fn math_renders_to_mathml() {
    let out = html("Euler: $e^{i\\pi}$");
    assert!(out.starts_with("<p>Euler: <span class=\"math math-inline\"><math"));

    let options = RenderOptions {
        math: false,
        ..Default::default()
    };
    let rendered = render_document("Price: $5", &options).unwrap();
    assert_eq!(rendered.html, "<p>Price: $5</p>");
}

#[test]
fn malformed_math_is_a_warning() {
    let rendered = render_document(
        "$\\begin{nosuchenv} x \\end{nosuchenv}$",
        &RenderOptions::default(),
    )
    .unwrap();
    assert!(rendered.html.contains("<code"));
    assert!(matches!(
        rendered.diagnostics.warnings.as_slice(),
        [Warning::Math { .. }]
    ));
}

#[test]
fn table_of_contents_is_inserted() {
    let source = "# Guide\n\n## Table of Contents\n\nstale\n\n## Install\n\n## Usage\n\n### Flags";
    let out = html(source);
    assert!(!out.contains("stale"));
    assert!(out.contains("<ol>"));
    assert!(out.contains("<a href=\"#install\">Install</a>"));
    assert!(out.contains("<a href=\"#usage\">Usage</a>"));
    assert!(out.contains("<a href=\"#flags\">Flags</a>"));

    let options = RenderOptions {
        toc_max_depth: 2,
        toc_ordered: false,
        ..Default::default()
    };
    let out = render_document(source, &options).unwrap().html;
    assert!(out.contains("<ul>"));
    assert!(!out.contains("href=\"#flags\">Flags</a>"));
}

/// Values of `attr="..."` in document order.
fn attr_values<'a>(html: &'a str, prefix: &str) -> Vec<&'a str> {
    html.match_indices(prefix)
        .filter_map(|(at, _)| {
            let value = &html[at + prefix.len()..];
            value.find('"').map(|end| &value[..end])
        })
        .collect()
}

#[test]
fn table_of_contents_links_resolve_to_heading_ids() {
    let source = "# Guide\n\n## Table of Contents\n\n### Setup\n\n## Setup\n\n> ## Setup\n\nFoo\nbar\n---\n\n### Setup\n";
    let out = html(source);
    let links = attr_values(&out, "<a href=\"#");
    let ids = attr_values(&out, " id=\"");

    assert_eq!(links, vec!["setup", "foo-bar", "setup-2"]);
    for link in &links {
        assert!(ids.contains(link), "no heading with id {link:?} in {out}");
    }
    assert!(ids.contains(&"setup-1"));
}

#[test]
fn multi_line_heading_slug_uses_hyphens() {
    assert!(html("Foo\nbar\n===").starts_with("<h1 id=\"foo-bar\">"));
}

#[test]
fn indented_continuation_lines_lose_indentation() {
    assert_eq!(html("a\n  b"), "<p>a<br />\nb</p>");
}

#[test]
fn rendering_is_deterministic() {
    let source = "# T\n\n==a== H~2~O :smile:\n\n```rust\nlet x = 1;\n```\n\n$$\nx^2\n$$";
    let first = render_document(source, &RenderOptions::default()).unwrap();
    let second = render_document(source, &RenderOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cancelled_render_produces_no_output() {
    let token = CancellationToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();

    let err = render_document_with_cancel("# Hi", &RenderOptions::default(), &token).unwrap_err();
    assert!(matches!(err, DocError::Cancelled { .. }));
}

#[test]
fn invalid_utf8_is_rejected() {
    let err = render_bytes(b"\xc3\x28", &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, DocError::MalformedInput { .. }));
}

#[test]
fn batch_matches_single_renders() {
    let sources = ["# One", "==two==", "x^3^"];
    let inputs = sources
        .iter()
        .enumerate()
        .map(|(i, source)| BatchInput {
            id: format!("{i}.md"),
            source: source.to_string(),
        })
        .collect();
    let outcome = render_batch(inputs, &RenderOptions::default(), &BatchOptions::default());

    assert_eq!(outcome.stats.succeeded, 3);
    for (result, source) in outcome.results.iter().zip(sources) {
        assert_eq!(result.result.as_ref().unwrap().html, html(source));
    }
}
