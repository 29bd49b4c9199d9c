// src/crawl/filter.rs
// =============================================================================
// Content admission: decides whether a URL is worth fetching at all.
//
// The same check runs twice in the crawl loop, once before fetching a
// dequeued URL and once before queueing a newly discovered link, so a URL
// that would never be fetched never takes up frontier space either.
//
// Rules, in order (first failure wins):
// 1. Binary file extensions (pdf, zip, images, media) are rejected
// 2. The domain's own structural rules (required / rejected path markers,
//    query strings) must pass
// Domains without rules accept anything that survives rule 1.
// =============================================================================

use crate::config::{AdmissionRules, CrawlTarget};
use std::collections::HashMap;
use url::Url;

/// Extensions that never contain extractable prose.
const BINARY_EXTENSIONS: &[&str] = &["pdf", "zip", "rar", "jpg", "png", "gif", "mp3", "mp4"];

/// Pure admission predicate built from the configured targets.
#[derive(Debug, Clone, Default)]
pub struct AdmissionPolicy {
    rules: HashMap<String, AdmissionRules>,
}

impl AdmissionPolicy {
    pub fn new(targets: &[CrawlTarget]) -> Self {
        let rules = targets
            .iter()
            .map(|t| (t.domain.clone(), t.rules.clone()))
            .collect();
        Self { rules }
    }

    /// Returns true when `url` on `domain` may be fetched or queued.
    ///
    /// Unparseable URLs are never admitted.
    pub fn admit(&self, domain: &str, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let path = parsed.path();

        if has_binary_extension(path) {
            return false;
        }

        match self.rules.get(domain) {
            Some(rules) => rules_pass(rules, path, parsed.query().is_some()),
            None => true,
        }
    }
}

fn has_binary_extension(path: &str) -> bool {
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    BINARY_EXTENSIONS
        .iter()
        .any(|bad| ext.eq_ignore_ascii_case(bad))
}

fn rules_pass(rules: &AdmissionRules, path: &str, has_query: bool) -> bool {
    if !rules.require.is_empty() && !rules.require.iter().any(|m| path.contains(m.as_str())) {
        return false;
    }
    if rules.reject.iter().any(|m| path.contains(m.as_str())) {
        return false;
    }
    if rules.reject_query && has_query {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{encyclopedia_rules, CrawlConfig};

    fn default_policy() -> AdmissionPolicy {
        AdmissionPolicy::new(&CrawlConfig::default().targets)
    }

    #[test]
    fn test_encyclopedia_namespaces() {
        let policy = AdmissionPolicy::new(&[CrawlTarget::new(
            "en-equivalent",
            10,
            encyclopedia_rules(),
        )]);

        assert!(!policy.admit("en-equivalent", "https://en-equivalent/wiki/Talk:X"));
        assert!(policy.admit("en-equivalent", "https://en-equivalent/wiki/Compression"));
        assert!(!policy.admit("en-equivalent", "https://en-equivalent/wiki/Special:Random"));
        assert!(!policy.admit("en-equivalent", "https://en-equivalent/w/index.php"));
    }

    #[test]
    fn test_binary_extensions_case_insensitive() {
        let policy = default_policy();
        assert!(!policy.admit("en.wikipedia.org", "https://en.wikipedia.org/wiki/Diagram.PNG"));
        assert!(!policy.admit("example.org", "https://example.org/files/paper.pdf"));
        assert!(policy.admit("example.org", "https://example.org/files/paper.html"));
    }

    #[test]
    fn test_developer_docs_require_locale_subtree() {
        let policy = default_policy();
        assert!(policy.admit(
            "developer.mozilla.org",
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Methods"
        ));
        assert!(!policy.admit(
            "developer.mozilla.org",
            "https://developer.mozilla.org/fr/docs/Web/HTTP/Methods"
        ));
    }

    #[test]
    fn test_learning_center_rejects_queries() {
        let policy = default_policy();
        assert!(policy.admit(
            "www.cloudflare.com",
            "https://www.cloudflare.com/learning/dns/what-is-dns"
        ));
        assert!(!policy.admit(
            "www.cloudflare.com",
            "https://www.cloudflare.com/learning/dns/what-is-dns?utm=x"
        ));
        assert!(!policy.admit("www.cloudflare.com", "https://www.cloudflare.com/plans"));
    }

    #[test]
    fn test_unconfigured_domain_accepts_by_default() {
        let policy = default_policy();
        assert!(policy.admit("example.net", "https://example.net/anything?x=1"));
    }

    #[test]
    fn test_admit_is_deterministic() {
        let policy = default_policy();
        let url = "https://en.wikipedia.org/wiki/Category:Networking";
        let first = policy.admit("en.wikipedia.org", url);
        for _ in 0..10 {
            assert_eq!(policy.admit("en.wikipedia.org", url), first);
        }
        assert!(!first);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(!default_policy().admit("example.net", "not a url"));
    }
}
