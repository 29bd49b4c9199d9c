// src/crawl/mod.rs
// =============================================================================
// The domain-scoped crawler.
//
// Submodules:
// - normalize: canonical URL form and domain resolution
// - links:     outbound link extraction from HTML
// - filter:    per-domain content admission rules
// - fetch:     the Fetcher seam and its reqwest implementation
// - queue:     the breadth-first crawl loop itself
// =============================================================================

mod fetch;
mod filter;
mod links;
mod normalize;
mod queue;

pub use fetch::{Fetcher, HttpFetcher};
pub use filter::AdmissionPolicy;
pub use links::{extract_links, links, page_links};
pub use normalize::{canonical_domain, domain_of, is_web_url, normalize_url};
pub use queue::{crawl, CrawlSummary, Crawler, FetchedPage, SkipCounts, SkipReason, Visit};
