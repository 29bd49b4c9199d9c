// src/crawl/links.rs
// =============================================================================
// Pulls outbound links out of a fetched page.
//
// For every <a href="..."> we:
// 1. Skip empty, same-page (#...), javascript: and mailto: hrefs
// 2. Resolve the href against the page URL (relative links become absolute)
// 3. Normalize the result (no fragment, no trailing slash)
// 4. Keep it only if it is an http/https URL
//
// No deduplication happens here; the crawl loop owns the visited set.
// =============================================================================

use super::normalize::{is_web_url, normalize_url};
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    // "a[href]" is a constant, known-valid selector
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("anchor selector"))
}

/// Lazily yields normalized absolute links found in `document`.
///
/// Parameters:
///   document: the parsed page
///   base: the URL the page was fetched from
pub fn links<'a>(document: &'a Html, base: &'a Url) -> impl Iterator<Item = String> + 'a {
    document
        .select(anchor_selector())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(move |href| resolve_link(base, href))
        .map(|absolute| normalize_url(&absolute))
        .filter(|url| is_web_url(url))
}

/// Collects every followable link of an already parsed page.
///
/// Returns an empty list when `base_url` itself is not a valid URL.
pub fn page_links(document: &Html, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(url = base_url, error = %e, "cannot resolve links against invalid base");
            return Vec::new();
        }
    };

    links(document, &base).collect()
}

/// Parses `html` and collects every followable link.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    page_links(&Html::parse_document(html), base_url)
}

// Resolves a link (possibly relative) to an absolute URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs, in-page anchors and script / email pseudo-links
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    base.join(href).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_link() {
        let links = extract_links(r#"<a href="/docs">Docs</a>"#, "https://example.com/page");
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_absolute_link_is_normalized() {
        let links = extract_links(
            r#"<a href="https://www.rust-lang.org/learn/#get-started">Rust</a>"#,
            "https://example.com",
        );
        assert_eq!(links, vec!["https://www.rust-lang.org/learn"]);
    }

    #[test]
    fn test_pseudo_links_yield_nothing() {
        let html = r##"
            <a href="#section">Jump</a>
            <a href="javascript:void(0)">Click</a>
            <a href="mailto:x@y.com">Mail</a>
        "##;
        let links = extract_links(html, "https://example.com/page");
        assert!(links.is_empty(), "unexpected links: {links:?}");
    }

    #[test]
    fn test_empty_and_non_web_hrefs_skipped() {
        let html = r#"
            <a href="">Empty</a>
            <a href="   ">Blank</a>
            <a href="ftp://files.example.com/x">FTP</a>
            <a href="tel:+123">Call</a>
        "#;
        assert!(extract_links(html, "https://example.com/page").is_empty());
    }

    #[test]
    fn test_keeps_duplicates_in_document_order() {
        let html = r#"
            <a href="../about">About</a>
            <a href="/about/">About again</a>
            <a href="https://other.org/x">Other</a>
        "#;
        let links = extract_links(html, "https://example.com/page/");
        assert_eq!(
            links,
            vec![
                "https://example.com/about",
                "https://example.com/about",
                "https://other.org/x",
            ]
        );
    }

    #[test]
    fn test_invalid_base_yields_nothing() {
        assert!(extract_links(r#"<a href="/x">x</a>"#, "not a url").is_empty());
    }
}
