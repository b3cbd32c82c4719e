//! Display-ready posts
//!
//! When an image proxy is configured, external images embedded in a post
//! message (`![alt](https://...)`) are routed through it before the post is
//! sent to clients.

use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use reaction_core::Post;

/// `![alt](url)` or `![alt](url "title")`; group 1 is the URL
static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]\n]*\]\(([^)\s]+)(?:\)|\s+"[^"\n]*"\))"#)
        .unwrap_or_else(|e| unreachable!("image link pattern: {e}"))
});

/// Everything but the unreserved set
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Rewrites markdown image links to go through an image proxy
#[derive(Debug, Clone, Default)]
pub struct ImageProxy {
    base_url: Option<String>,
}

impl ImageProxy {
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
        }
    }

    /// Proxy that leaves every message untouched
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    /// Proxied form of an image URL
    ///
    /// Non-http URLs and URLs already pointing at the proxy are returned as-is.
    /// A URL points at the proxy only when the base is followed by nothing,
    /// `/` or `?`, so look-alike hosts are still proxied.
    pub fn proxy_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        let Some(base) = self.base_url.as_deref() else {
            return Cow::Borrowed(url);
        };
        let external = url.starts_with("http://") || url.starts_with("https://");
        let already = url
            .strip_prefix(base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']));
        if !external || already {
            return Cow::Borrowed(url);
        }
        Cow::Owned(format!("{base}?url={}", utf8_percent_encode(url, QUERY_VALUE)))
    }

    /// Rewrite every markdown image link in a message
    pub fn rewrite<'m>(&self, message: &'m str) -> Cow<'m, str> {
        if !self.is_enabled() || !message.contains("![") {
            return Cow::Borrowed(message);
        }

        let mut out = String::new();
        let mut copied = 0;
        for link in IMAGE_LINK.captures_iter(message) {
            let Some(url) = link.get(1) else { continue };
            if let Cow::Owned(proxied) = self.proxy_url(url.as_str()) {
                out.push_str(&message[copied..url.start()]);
                out.push_str(&proxied);
                copied = url.end();
            }
        }

        if copied == 0 {
            return Cow::Borrowed(message);
        }
        out.push_str(&message[copied..]);
        Cow::Owned(out)
    }

    /// Rewrite a post's message in place
    pub fn apply(&self, post: &mut Post) {
        if let Cow::Owned(message) = self.rewrite(&post.message) {
            post.message = message;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaction_core::Snowflake;

    fn proxy() -> ImageProxy {
        ImageProxy::new(Some("https://proxy.example.com/image/".to_string()))
    }

    #[test]
    fn test_disabled_proxy_leaves_message() {
        let msg = "look ![cat](https://cats.example.com/cat.png)";
        assert!(matches!(ImageProxy::disabled().rewrite(msg), Cow::Borrowed(m) if m == msg));
    }

    #[test]
    fn test_rewrites_external_images() {
        let rewritten = proxy().rewrite("look ![cat](https://cats.example.com/a b.png) and ![dog](http://d.example.com/d.png?s=1)!");
        // The first link contains whitespace and is not an image link
        assert_eq!(
            rewritten,
            "look ![cat](https://cats.example.com/a b.png) and ![dog](https://proxy.example.com/image?url=http%3A%2F%2Fd.example.com%2Fd.png%3Fs%3D1)!"
        );
    }

    #[test]
    fn test_skips_relative_and_already_proxied_urls() {
        let p = proxy();
        assert_eq!(p.proxy_url("/static/logo.png"), "/static/logo.png");
        let already = "https://proxy.example.com/image?url=x";
        assert_eq!(p.proxy_url(already), already);
        assert!(matches!(p.rewrite("![logo](/static/logo.png)"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_look_alike_host_is_still_proxied() {
        let p = proxy();
        assert_eq!(
            p.proxy_url("https://proxy.example.com.evil.net/x.png"),
            "https://proxy.example.com/image?url=https%3A%2F%2Fproxy.example.com.evil.net%2Fx.png"
        );
        assert_eq!(
            p.proxy_url("https://proxy.example.com/imagery/x.png"),
            "https://proxy.example.com/image?url=https%3A%2F%2Fproxy.example.com%2Fimagery%2Fx.png"
        );
        let nested = "https://proxy.example.com/image/cached/x.png";
        assert_eq!(p.proxy_url(nested), nested);
    }

    #[test]
    fn test_titled_links_are_proxied() {
        assert_eq!(
            proxy().rewrite(r#"![a](https://x.example.com/a.png "t") done"#),
            r#"![a](https://proxy.example.com/image?url=https%3A%2F%2Fx.example.com%2Fa.png "t") done"#
        );
    }

    #[test]
    fn test_non_ascii_urls_are_utf8_encoded() {
        assert_eq!(
            proxy().proxy_url("https://x.example.com/é.png"),
            "https://proxy.example.com/image?url=https%3A%2F%2Fx.example.com%2F%C3%A9.png"
        );
    }

    #[test]
    fn test_unterminated_links_are_kept() {
        let msg = "broken ![alt](https://x.example.com/a.png and ![";
        assert_eq!(proxy().rewrite(msg), msg);
    }

    #[test]
    fn test_apply_to_post() {
        let mut post = Post::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            "![x](https://img.example.com/x.gif)".to_string(),
        );
        proxy().apply(&mut post);
        assert_eq!(
            post.message,
            "![x](https://proxy.example.com/image?url=https%3A%2F%2Fimg.example.com%2Fx.gif)"
        );
    }
}
