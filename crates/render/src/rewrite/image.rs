//! Size and alignment directives on image URLs.
//!
//! `![alt](photo.png=300x200)` sets width and height, either side may be
//! omitted. `![alt](photo.png#pic_center)` and `#pic_right` set a class, and
//! may carry their own `=WxH` suffix. Directives are stripped from the URL and
//! recorded as render hints on the image node.

use docshelf_core::{AstTransform, Node, NodeData, NodeKind, Visit, walk};

const ALIGN_MARKER: &str = "#pic_";

/// Parsed `=WxH` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Dimensions {
    width: Option<String>,
    height: Option<String>,
}

impl Dimensions {
    fn merge_into(self, data: &mut NodeData) {
        data.merge_property("width", self.width);
        data.merge_property("height", self.height);
    }
}

/// Splits `url` into its base and a trailing `=(\d*)x(\d*)` suffix.
fn split_dimensions(url: &str) -> Option<(&str, Dimensions)> {
    let eq = url.rfind('=')?;
    let (width, height) = url[eq + 1..].split_once('x')?;
    if !width.bytes().all(|b| b.is_ascii_digit()) || !height.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let non_empty = |digits: &str| (!digits.is_empty()).then(|| digits.to_string());
    Some((
        &url[..eq],
        Dimensions {
            width: non_empty(width),
            height: non_empty(height),
        },
    ))
}

/// Splits `url` into its base, the alignment class and an optional embedded
/// dimension suffix.
fn split_alignment(url: &str) -> Option<(&str, &'static str, Option<Dimensions>)> {
    let marker = url.rfind(ALIGN_MARKER)?;
    let directive = &url[marker + ALIGN_MARKER.len()..];

    let (name, dimensions) = if directive.contains('=') {
        let (name, dims) = split_dimensions(directive)?;
        (name, Some(dims))
    } else {
        (directive, None)
    };

    let class = match name {
        "center" => "mx-auto block",
        "right" => "ml-auto block",
        _ => return None,
    };
    Some((&url[..marker], class, dimensions))
}

/// Applies both directive grammars to one image.
fn apply_directives(url: &mut String, data: &mut NodeData) {
    if let Some((base, dimensions)) = split_dimensions(url) {
        let base_len = base.len();
        dimensions.merge_into(data);
        url.truncate(base_len);
    }

    if let Some((base, class, dimensions)) = split_alignment(url) {
        let base_len = base.len();
        data.merge_property("className", Some(class.to_string()));
        if let Some(dimensions) = dimensions {
            dimensions.merge_into(data);
        }
        url.truncate(base_len);
    }
}

/// Rewrites image nodes carrying size or alignment directives.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDirectives;

impl AstTransform for ImageDirectives {
    fn name(&self) -> &'static str {
        "image-directives"
    }

    fn transform(&self, root: &mut Node) {
        walk(root, &mut |node: &mut Node, _: usize, _: &NodeKind| {
            let Node { kind, data, .. } = node;
            if let NodeKind::Image { url, .. } = kind {
                apply_directives(url, data);
                return Visit::SkipChildren;
            }
            Visit::Continue
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_core::{ParseOptions, parse_markdown};

    fn first_image(markdown: &str) -> Node {
        let mut root = parse_markdown(markdown, &ParseOptions::docs()).unwrap();
        ImageDirectives.transform(&mut root);
        root.descendants()
            .find(|node| matches!(node.kind, NodeKind::Image { .. }))
            .cloned()
            .unwrap()
    }

    fn url_of(node: &Node) -> &str {
        match &node.kind {
            NodeKind::Image { url, .. } => url,
            _ => unreachable!(),
        }
    }

    #[test]
    fn width_and_height() {
        let image = first_image("![a](image.png=300x200)");
        assert_eq!(url_of(&image), "image.png");
        assert_eq!(image.data.property("width"), Some("300"));
        assert_eq!(image.data.property("height"), Some("200"));
    }

    #[test]
    fn one_side_omitted() {
        let image = first_image("![a](image.png=300x)");
        assert_eq!(url_of(&image), "image.png");
        assert_eq!(image.data.property("width"), Some("300"));
        assert_eq!(image.data.property("height"), None);

        let image = first_image("![a](image.png=x200)");
        assert_eq!(image.data.property("width"), None);
        assert_eq!(image.data.property("height"), Some("200"));
    }

    #[test]
    fn center_alignment_sets_class_only() {
        let image = first_image("![a](image.png#pic_center)");
        assert_eq!(url_of(&image), "image.png");
        assert_eq!(image.data.property("className"), Some("mx-auto block"));
        assert_eq!(image.data.property("width"), None);
        assert_eq!(image.data.property("height"), None);
    }

    #[test]
    fn right_alignment_with_dimensions() {
        let image = first_image("![a](image.png#pic_right=640x)");
        assert_eq!(url_of(&image), "image.png");
        assert_eq!(image.data.property("className"), Some("ml-auto block"));
        assert_eq!(image.data.property("width"), Some("640"));
        assert_eq!(image.data.property("height"), None);
    }

    #[test]
    fn only_the_trailing_suffix_is_stripped() {
        let image = first_image("![a](/img/a=1x1/b.png=20x10)");
        assert_eq!(url_of(&image), "/img/a=1x1/b.png");
        assert_eq!(image.data.property("width"), Some("20"));
    }

    #[test]
    fn unrelated_urls_are_untouched() {
        for url in ["photo.png", "page?id=3", "a.png#pic_left", "a.png=axb"] {
            let image = first_image(&format!("![a]({url})"));
            assert_eq!(url_of(&image), url);
            assert!(image.data.is_empty());
        }
    }

    #[test]
    fn existing_hints_are_not_cleared() {
        let mut data = NodeData::default();
        data.merge_property("width", Some("50".to_string()));
        let mut url = "a.png#pic_center".to_string();
        apply_directives(&mut url, &mut data);
        assert_eq!(data.property("width"), Some("50"));
        assert_eq!(data.property("className"), Some("mx-auto block"));
    }
}
