//! Allow-list sanitization for post bodies.
//!
//! Post HTML is author-supplied and rendered as rich content, so this policy
//! is the XSS boundary of the client. Changing either list changes what a
//! hostile post can smuggle through; every entry is pinned by a test below.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ammonia::Builder;
use lazy_static::lazy_static;

/// A named tag/attribute allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlPolicy {
    pub tags: &'static [&'static str],
    pub attributes: &'static [&'static str],
    /// Schemes accepted in `href`/`src`. `data:` is further limited to images.
    pub url_schemes: &'static [&'static str],
}

pub const POST_CONTENT_POLICY: HtmlPolicy = HtmlPolicy {
    tags: &[
        "p",
        "br",
        "strong",
        "em",
        "u",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "ul",
        "ol",
        "li",
        "a",
        "blockquote",
        "code",
        "pre",
        "img",
    ],
    attributes: &["href", "target", "rel", "src", "alt", "title", "class"],
    url_schemes: &["http", "https", "mailto", "tel", "data"],
};

impl HtmlPolicy {
    pub fn builder(&self) -> Builder<'static> {
        let mut builder = Builder::default();
        builder
            .tags(self.tags.iter().copied().collect())
            .tag_attributes(HashMap::new())
            .generic_attributes(self.attributes.iter().copied().collect())
            .url_schemes(self.url_schemes.iter().copied().collect())
            .clean_content_tags(HashSet::from(["script", "style"]))
            .link_rel(None)
            .strip_comments(true)
            .attribute_filter(restrict_data_urls);
        builder
    }
}

/// `data:` URLs survive only as `<img src="data:image/...">`.
fn restrict_data_urls<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    let is_data = value
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
    if !is_data {
        return Some(Cow::Borrowed(value));
    }
    let is_image = value
        .trim_start()
        .get(..11)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:image/"));
    if element == "img" && attribute == "src" && is_image {
        Some(Cow::Borrowed(value))
    } else {
        None
    }
}

lazy_static! {
    static ref POST_SANITIZER: Builder<'static> = POST_CONTENT_POLICY.builder();
}

/// Strips everything `POST_CONTENT_POLICY` does not allow.
pub fn sanitize_post_html(html: &str) -> String {
    POST_SANITIZER.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn allow_lists_are_pinned() {
        assert_eq!(
            POST_CONTENT_POLICY.tags,
            &[
                "p", "br", "strong", "em", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
                "li", "a", "blockquote", "code", "pre", "img"
            ]
        );
        assert_eq!(
            POST_CONTENT_POLICY.attributes,
            &["href", "target", "rel", "src", "alt", "title", "class"]
        );
    }

    #[test]
    fn script_tags_and_their_content_are_removed() {
        let cleaned = sanitize_post_html("<p>hi</p><script>alert('x')</script>");
        assert_eq!(cleaned, "<p>hi</p>");
        assert!(!cleaned.contains("alert"));
    }

    #[test]
    fn event_handlers_and_styles_are_stripped() {
        let cleaned = sanitize_post_html(
            r#"<p style="color:red" class="lead" onclick="steal()">x</p><img src="a.png" onerror="steal()">"#,
        );
        assert_eq!(cleaned, r#"<p class="lead">x</p><img src="a.png">"#);
    }

    #[test]
    fn javascript_urls_are_dropped() {
        let cleaned = sanitize_post_html(r#"<a href="javascript:alert(1)">click</a>"#);
        assert_eq!(cleaned, "<a>click</a>");
    }

    #[test]
    fn unknown_tags_are_unwrapped_not_deleted() {
        let cleaned = sanitize_post_html("<div><span>kept text</span></div>");
        assert_eq!(cleaned, "kept text");
    }

    #[test]
    fn iframes_and_styles_vanish() {
        let cleaned = sanitize_post_html(
            r#"<style>body{display:none}</style><iframe src="https://evil.example"></iframe><p>ok</p>"#,
        );
        assert_eq!(cleaned, "<p>ok</p>");
    }

    #[test]
    fn allowed_markup_is_unchanged() {
        let html = concat!(
            r#"<h2>Title</h2><p>Hello <strong>bold</strong> <em>it</em> <u>un</u><br>"#,
            r#"<a href="https://example.com" target="_blank" rel="noopener" title="t">link</a></p>"#,
            r#"<ul><li>one</li></ul><ol><li>two</li></ol><blockquote>q</blockquote>"#,
            r#"<pre><code>let x = 1;</code></pre><img src="https://example.com/a.png" alt="a">"#
        );
        assert_eq!(sanitize_post_html(html), html);
    }

    #[test]
    fn data_urls_only_survive_on_images() {
        let image = r#"<img src="data:image/png;base64,iVBORw0KGgo=">"#;
        assert_eq!(sanitize_post_html(image), image);
        let link = sanitize_post_html(r#"<a href="data:text/html;base64,PHNjcmlwdD4=">x</a>"#);
        assert_eq!(link, "<a>x</a>");
        let svg = sanitize_post_html(r#"<img src="data:text/html,hi">"#);
        assert_eq!(svg, "<img>");
    }
}
