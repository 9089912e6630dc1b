//! HTML link extraction
//!
//! Collects the outbound references of a fetched page: anchors, `link`
//! imports (stylesheets, alternates, icons), and anything carrying a `src`
//! attribute (images, scripts, media). Relative references are resolved
//! against the page URL and everything is canonicalized before it reaches
//! the orchestrator.

use crate::url::canonicalize;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Parses HTML bytes and returns the canonicalized set of outbound
/// references found in the page.
///
/// The result is a set, so a URL referenced many times within one page
/// appears once. Scheme filtering happens implicitly: references that do
/// not resolve against the base URL are dropped.
pub fn extract_links(base_url: &Url, html: &[u8]) -> HashSet<String> {
    tracing::debug!("parsing {} for links", base_url);

    let text = String::from_utf8_lossy(html);
    let document = Html::parse_document(&text);

    let mut links = HashSet::new();

    // Anchors.
    collect_attr(&document, "a[href]", "href", base_url, &mut links);

    // Imports.
    collect_attr(&document, "link[href]", "href", base_url, &mut links);

    // Media.
    collect_attr(&document, "[src]", "src", base_url, &mut links);

    links
}

fn collect_attr(
    document: &Html,
    selector: &str,
    attr: &str,
    base_url: &Url,
    links: &mut HashSet<String>,
) {
    // The selectors are fixed strings, so parse cannot fail at runtime.
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(_) => return,
    };

    for element in document.select(&selector) {
        if let Some(value) = element.value().attr(attr) {
            match base_url.join(value.trim()) {
                Ok(absolute) => {
                    links.insert(canonicalize(absolute.as_str()));
                }
                Err(error) => {
                    tracing::debug!(
                        "unresolvable reference {:?} on {}: {}",
                        value,
                        base_url,
                        error
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("http://x.tumblr.com/post/1").unwrap()
    }

    #[test]
    fn test_extract_anchor_links() {
        let html = br#"<html><body><a href="/post/2/world">next</a></body></html>"#;
        let links = extract_links(&base_url(), html);
        assert!(links.contains("http://x.tumblr.com/post/2"));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_extract_link_imports() {
        let html = br#"<html><head><link rel="stylesheet" href="/theme.css"></head></html>"#;
        let links = extract_links(&base_url(), html);
        assert!(links.contains("http://x.tumblr.com/theme.css"));
    }

    #[test]
    fn test_extract_src_attributes() {
        let html = br#"<html><body>
            <img src="/photo.jpg">
            <script src="/app.js"></script>
        </body></html>"#;
        let links = extract_links(&base_url(), html);
        assert!(links.contains("http://x.tumblr.com/photo.jpg"));
        assert!(links.contains("http://x.tumblr.com/app.js"));
    }

    #[test]
    fn test_absolute_links_kept_absolute() {
        let html = br#"<html><body><a href="http://other.example/page?q=1">x</a></body></html>"#;
        let links = extract_links(&base_url(), html);
        assert!(links.contains("http://other.example/page"));
    }

    #[test]
    fn test_links_are_canonicalized() {
        let html = br#"<html><body>
            <a href="/post/7/some-long-slug#notes">a</a>
            <a href="/tagged/cats%20and%20dogs">b</a>
        </body></html>"#;
        let links = extract_links(&base_url(), html);
        assert!(links.contains("http://x.tumblr.com/post/7"));
        assert!(links.contains("http://x.tumblr.com/tagged/cats-and-dogs"));
    }

    #[test]
    fn test_duplicate_references_deduped() {
        let html = br#"<html><body>
            <a href="/post/2/foo">one</a>
            <a href="/post/2/bar?page=2">two</a>
            <a href="http://x.tumblr.com/post/2">three</a>
        </body></html>"#;
        let links = extract_links(&base_url(), html);
        assert_eq!(links.len(), 1);
        assert!(links.contains("http://x.tumblr.com/post/2"));
    }

    #[test]
    fn test_no_links_in_plain_page() {
        let html = br#"<html><body><p>just text</p></body></html>"#;
        let links = extract_links(&base_url(), html);
        assert!(links.is_empty());
    }

    #[test]
    fn test_relative_links_resolved_against_base() {
        let base = Url::parse("http://x.tumblr.com/tagged/cats").unwrap();
        let html = br#"<html><body><a href="dogs">sibling</a></body></html>"#;
        let links = extract_links(&base, html);
        assert!(links.contains("http://x.tumblr.com/tagged/dogs"));
    }

    #[test]
    fn test_invalid_utf8_handled_lossily() {
        let mut html = b"<html><body><a href=\"/page\">ok</a>".to_vec();
        html.extend_from_slice(&[0xff, 0xfe]);
        html.extend_from_slice(b"</body></html>");
        let links = extract_links(&base_url(), &html);
        assert!(links.contains("http://x.tumblr.com/page"));
    }
}
