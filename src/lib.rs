// src/lib.rs
// =============================================================================
// topic-crawler: collects clean page text from a small allow-list of domains
// and defines the boundary the retrieval / answer layer plugs into.
//
// Modules:
// - config:  crawl profile (seeds, per-domain quotas and rules, politeness)
// - crawl:   normalizer, link extractor, admission filter, fetcher, crawl loop
// - extract: title and main-text extraction from HTML
// - output:  PageRecord and the JSON-lines record stream
// - rag:     retrieval and generation interfaces over the crawled corpus
// - error:   typed errors for all of the above
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod output;
pub mod rag;

pub use config::{AdmissionRules, CrawlConfig, CrawlTarget};
pub use crawl::{crawl, CrawlSummary, Crawler};
pub use error::{ConfigError, CrawlError, FetchError};
pub use output::{PageRecord, RecordWriter};
