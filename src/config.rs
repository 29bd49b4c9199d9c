// src/config.rs
// =============================================================================
// The crawl profile: which domains may be crawled, how many pages each one
// may contribute, which URLs count as content, and how politely to fetch.
//
// The built-in default reproduces the networking-topic profile. A JSON file
// can override any part of it; fields that are left out keep their defaults
// thanks to #[serde(default)].
//
// Example file:
//   {
//     "seeds": ["https://en.wikipedia.org/wiki/Computer_network"],
//     "targets": [
//       { "domain": "en.wikipedia.org", "max_pages": 10,
//         "rules": { "require": ["/wiki/"], "reject": ["/wiki/Talk:"] } }
//     ],
//     "delay_ms": 500
//   }
// =============================================================================

use crate::crawl::canonical_domain;
use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-domain structural admission rules.
///
/// All markers are matched as substrings of the URL path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionRules {
    /// At least one of these must appear in the path (empty = no requirement).
    pub require: Vec<String>,
    /// None of these may appear in the path.
    pub reject: Vec<String>,
    /// Refuse any URL that carries a query string.
    pub reject_query: bool,
}

/// One allow-listed domain with its page quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    /// Host name as it appears in URLs (port included when non-default).
    /// Stored in canonical form, so "EN.Wikipedia.org" becomes "en.wikipedia.org".
    #[serde(deserialize_with = "deserialize_domain")]
    pub domain: String,
    /// Maximum number of successful fetches for this domain in one run.
    pub max_pages: u32,
    #[serde(default)]
    pub rules: AdmissionRules,
}

impl CrawlTarget {
    pub fn new(domain: impl Into<String>, max_pages: u32, rules: AdmissionRules) -> Self {
        Self {
            domain: canonical_domain(&domain.into()),
            max_pages,
            rules,
        }
    }
}

fn deserialize_domain<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(canonical_domain(&raw))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed URLs, in the order they enter the frontier.
    pub seeds: Vec<String>,
    pub targets: Vec<CrawlTarget>,
    /// Value of the User-Agent header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Pause after every fetch attempt, in milliseconds.
    pub delay_ms: u64,
    /// Where the JSON-lines records are written.
    pub output: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        let seeds = [
            // Wikipedia (networking core)
            "https://en.wikipedia.org/wiki/Computer_network",
            "https://en.wikipedia.org/wiki/Internet_protocol_suite",
            "https://en.wikipedia.org/wiki/Transmission_Control_Protocol",
            "https://en.wikipedia.org/wiki/User_Datagram_Protocol",
            "https://en.wikipedia.org/wiki/Domain_Name_System",
            "https://en.wikipedia.org/wiki/Hypertext_Transfer_Protocol",
            "https://en.wikipedia.org/wiki/HTTPS",
            "https://en.wikipedia.org/wiki/Transport_layer",
            "https://en.wikipedia.org/wiki/IP_address",
            "https://en.wikipedia.org/wiki/Router_(computing)",
            "https://en.wikipedia.org/wiki/Network_address_translation",
            "https://en.wikipedia.org/wiki/Firewall_(computing)",
            "https://en.wikipedia.org/wiki/Virtual_private_network",
            // MDN (HTTP basics)
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Overview",
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Methods",
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/Status",
            // Cloudflare Learning Center
            "https://www.cloudflare.com/learning/dns/what-is-dns/",
            "https://www.cloudflare.com/learning/ssl/what-is-https/",
            "https://www.cloudflare.com/learning/network-layer/what-is-a-proxy/",
            "https://www.cloudflare.com/learning/ddos/what-is-a-ddos-attack/",
        ];

        Self {
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
            targets: vec![
                CrawlTarget::new("en.wikipedia.org", 45, encyclopedia_rules()),
                CrawlTarget::new(
                    "developer.mozilla.org",
                    35,
                    AdmissionRules {
                        require: vec!["/en-US/docs/".to_string()],
                        ..AdmissionRules::default()
                    },
                ),
                CrawlTarget::new(
                    "www.cloudflare.com",
                    25,
                    AdmissionRules {
                        require: vec!["/learning/".to_string()],
                        reject_query: true,
                        ..AdmissionRules::default()
                    },
                ),
            ],
            user_agent: "IR-RAG-Networking-Project/1.0 (+course project)".to_string(),
            timeout_secs: 25,
            delay_ms: 1000,
            output: PathBuf::from("data/raw_pages.jsonl"),
        }
    }
}

/// Article-only rules for a MediaWiki encyclopedia.
pub fn encyclopedia_rules() -> AdmissionRules {
    AdmissionRules {
        require: vec!["/wiki/".to_string()],
        reject: ["Special:", "Help:", "Category:", "Template:", "Talk:"]
            .iter()
            .map(|ns| format!("/wiki/{ns}"))
            .collect(),
        reject_query: false,
    }
}

impl CrawlConfig {
    /// Loads a profile from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: CrawlConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants a run relies on.
    ///
    /// A zero quota is allowed: that domain simply never gets fetched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.domain.trim().is_empty() {
                return Err(ConfigError::EmptyDomain);
            }
            if !seen.insert(target.domain.as_str()) {
                return Err(ConfigError::DuplicateDomain(target.domain.clone()));
            }
            if target.max_pages == 0 {
                tracing::warn!(domain = %target.domain, "quota is zero, domain will never be fetched");
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Sum of all quotas: the upper bound on successful fetches in one run.
    pub fn total_budget(&self) -> u64 {
        self.targets.iter().map(|t| u64::from(t.max_pages)).sum()
    }
}
