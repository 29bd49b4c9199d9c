// src/crawl/normalize.rs
// =============================================================================
// Canonical URL form used for the frontier and the visited set.
//
// Only two things change: the fragment goes away, and the trailing slash is
// dropped (a run of slashes counts as one, so the form is stable under
// repeated normalization). Case, query parameters and percent-encoding are
// left exactly as they were, so "https://a/b#x", "https://a/b/" and
// "https://a/b" all end up as the same string and dedup together.
// =============================================================================

use url::{Host, Url};

/// Returns the canonical form of `url`.
///
/// Example:
///   "https://example.com/docs/#intro" -> "https://example.com/docs"
pub fn normalize_url(url: &str) -> String {
    let without_fragment = match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    };

    // Whole trailing run, not a single slash, so a second pass changes nothing
    without_fragment.trim_end_matches('/').to_string()
}

/// Canonical form of a configured domain, comparable with `domain_of`.
///
/// The host is lowercased (and IDNA-encoded, as the URL parser does for
/// hosts it sees in links); an explicit `:port` suffix is kept. Input that
/// is not a valid host is only lowercased, and validation reports it later.
///
/// Example:
///   "EN.Wikipedia.org" -> "en.wikipedia.org"
pub fn canonical_domain(domain: &str) -> String {
    let domain = domain.trim();
    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (host, Some(port))
        }
        _ => (domain, None),
    };

    let host = match Host::parse(host) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => host.to_lowercase(),
    };

    match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}

/// Resolves the domain a URL belongs to: the host, plus the port when the URL
/// spells one out. Returns None for URLs without a host.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// True for absolute http/https URLs, the only kind the crawler follows.
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
