// src/crawl/queue.rs
// =============================================================================
// The breadth-first crawl loop.
//
// How it works:
// 1. Seed URLs are normalized and placed in the frontier, in order
// 2. Each dequeued URL is marked visited before anything else happens, so a
//    URL is fetched at most once per run even when links form cycles
// 3. Off-target domains, exhausted quotas and filtered URLs are skipped
// 4. A successful fetch is extracted; non-empty text becomes a PageRecord
//    that is written immediately
// 5. The domain's counter goes up for every successful fetch, even when the
//    page had no usable text
// 6. Same-domain links that pass the admission filter join the frontier tail
// 7. A fixed delay follows every fetch attempt
//
// The loop ends when the frontier is empty. Failures on individual URLs are
// logged and skipped; only output-stream errors abort the run.
//
// Rust concepts:
// - VecDeque: FIFO frontier (push_back / pop_front)
// - HashSet: visited set with O(1) lookup
// - Enums: Visit describes every way one URL can end
// =============================================================================

use super::fetch::{Fetcher, HttpFetcher};
use super::filter::AdmissionPolicy;
use super::links::page_links;
use super::normalize::{domain_of, normalize_url};
use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use crate::extract::{Extractor, HtmlExtractor};
use crate::output::{PageRecord, RecordWriter};
use indicatif::ProgressBar;
use scraper::Html;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a dequeued URL was discarded without a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyVisited,
    /// No host, or a host outside the configured targets.
    OffTarget,
    QuotaExhausted,
    NotAdmitted,
}

/// A page that was fetched successfully.
#[derive(Debug)]
pub struct FetchedPage {
    pub domain: String,
    /// None when the page produced no usable text.
    pub record: Option<PageRecord>,
    /// Outbound links, normalized, in document order.
    pub links: Vec<String>,
}

/// Outcome of processing one frontier entry.
#[derive(Debug)]
pub enum Visit {
    Fetched(FetchedPage),
    Skipped(SkipReason),
    Failed(FetchError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub already_visited: usize,
    pub off_target: usize,
    pub quota_exhausted: usize,
    pub not_admitted: usize,
}

impl SkipCounts {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::AlreadyVisited => self.already_visited += 1,
            SkipReason::OffTarget => self.off_target += 1,
            SkipReason::QuotaExhausted => self.quota_exhausted += 1,
            SkipReason::NotAdmitted => self.not_admitted += 1,
        }
    }
}

/// End-of-run report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Records written to the output stream.
    pub written: usize,
    /// Successful fetches per configured domain.
    pub crawled: BTreeMap<String, u32>,
    /// Successful fetches that yielded no text.
    pub empty: usize,
    /// Fetch attempts that failed.
    pub failed: usize,
    pub skipped: SkipCounts,
}

/// Mutable state of one run. Nothing here outlives the run.
#[derive(Debug)]
struct CrawlState {
    frontier: VecDeque<String>,
    visited: HashSet<String>,
    crawled: BTreeMap<String, u32>,
}

impl CrawlState {
    fn new<'a>(seeds: &[String], domains: impl Iterator<Item = &'a String>) -> Self {
        Self {
            frontier: seeds.iter().map(|s| normalize_url(s)).collect(),
            visited: HashSet::new(),
            crawled: domains.map(|d| (d.clone(), 0)).collect(),
        }
    }
}

pub struct Crawler<F, E> {
    fetcher: F,
    extractor: E,
    policy: AdmissionPolicy,
    quotas: HashMap<String, u32>,
    seeds: Vec<String>,
    delay: Duration,
    progress: ProgressBar,
}

impl Crawler<HttpFetcher, HtmlExtractor> {
    /// Crawler that fetches over HTTP with the profile's user agent and timeout.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
        Ok(Self::new(config, fetcher, HtmlExtractor::new()))
    }
}

impl<F: Fetcher, E: Extractor> Crawler<F, E> {
    pub fn new(config: &CrawlConfig, fetcher: F, extractor: E) -> Self {
        Self {
            fetcher,
            extractor,
            policy: AdmissionPolicy::new(&config.targets),
            quotas: config
                .targets
                .iter()
                .map(|t| (t.domain.clone(), t.max_pages))
                .collect(),
            seeds: config.seeds.clone(),
            delay: config.delay(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports each successful fetch on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the crawl to completion, appending records to `writer`.
    ///
    /// Returns an error only when the output stream fails; everything
    /// already written stays valid.
    pub async fn run<W: Write>(
        &self,
        writer: &mut RecordWriter<W>,
    ) -> Result<CrawlSummary, CrawlError> {
        let mut state = CrawlState::new(&self.seeds, self.quotas.keys());
        let mut summary = CrawlSummary::default();

        info!(
            seeds = state.frontier.len(),
            domains = self.quotas.len(),
            "starting crawl"
        );

        while let Some(url) = state.frontier.pop_front() {
            match self.visit(&mut state, &url).await {
                Visit::Skipped(reason) => {
                    debug!(url = %url, ?reason, "skipped");
                    summary.skipped.record(reason);
                }
                Visit::Failed(error) => {
                    warn!(url = %url, error = %error, "fetch failed");
                    summary.failed += 1;
                    self.pause().await;
                }
                Visit::Fetched(page) => {
                    match &page.record {
                        Some(record) => {
                            if let Err(source) = writer.append(record) {
                                return Err(CrawlError::Output {
                                    path: writer.path().to_path_buf(),
                                    source,
                                });
                            }
                            summary.written += 1;
                        }
                        None => {
                            debug!(url = %url, "no extractable text");
                            summary.empty += 1;
                        }
                    }

                    if let Some(count) = state.crawled.get_mut(&page.domain) {
                        *count += 1;
                    }
                    self.progress.inc(1);

                    let queued = self.enqueue_links(&mut state, &page);
                    debug!(url = %url, links = page.links.len(), queued, "fetched");

                    self.pause().await;
                }
            }
        }

        self.progress.finish_and_clear();
        summary.crawled = state.crawled;

        info!(
            written = summary.written,
            failed = summary.failed,
            "crawl finished"
        );
        Ok(summary)
    }

    // Steps 1-7 for one dequeued URL: dedup, domain and quota checks,
    // admission, fetch, extraction.
    async fn visit(&self, state: &mut CrawlState, url: &str) -> Visit {
        if !state.visited.insert(url.to_string()) {
            return Visit::Skipped(SkipReason::AlreadyVisited);
        }

        let Some(domain) = domain_of(url) else {
            return Visit::Skipped(SkipReason::OffTarget);
        };
        let Some(&quota) = self.quotas.get(&domain) else {
            return Visit::Skipped(SkipReason::OffTarget);
        };

        let crawled = state.crawled.get(&domain).copied().unwrap_or(0);
        if crawled >= quota {
            return Visit::Skipped(SkipReason::QuotaExhausted);
        }

        if !self.policy.admit(&domain, url) {
            return Visit::Skipped(SkipReason::NotAdmitted);
        }

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(error) => return Visit::Failed(error),
        };

        self.extract(url, domain, &html)
    }

    // Parses the page once; title, text and links all read the same document.
    fn extract(&self, url: &str, domain: String, html: &str) -> Visit {
        let document = Html::parse_document(html);

        let text = self.extractor.main_text(&document).trim().to_string();
        let record = (!text.is_empty()).then(|| PageRecord {
            url: url.to_string(),
            title: self.extractor.title(&document),
            domain: domain.clone(),
            text,
        });

        Visit::Fetched(FetchedPage {
            links: page_links(&document, url),
            domain,
            record,
        })
    }

    // Queues same-domain links that pass admission and have not been visited.
    // Quotas are not checked here; exhausted domains are discarded at dequeue.
    fn enqueue_links(&self, state: &mut CrawlState, page: &FetchedPage) -> usize {
        let mut queued = 0;
        for link in &page.links {
            if domain_of(link).as_deref() != Some(page.domain.as_str()) {
                continue;
            }
            if state.visited.contains(link) || !self.policy.admit(&page.domain, link) {
                continue;
            }
            state.frontier.push_back(link.clone());
            queued += 1;
        }
        queued
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Opens the output stream, then crawls with the HTTP fetcher.
///
/// Failing to open the output aborts before any request is sent.
pub async fn crawl(
    config: &CrawlConfig,
    progress: ProgressBar,
) -> Result<CrawlSummary, CrawlError> {
    let mut writer = RecordWriter::create(&config.output).map_err(|source| CrawlError::Output {
        path: config.output.clone(),
        source,
    })?;

    let crawler = Crawler::from_config(config)?.with_progress(progress);
    crawler.run(&mut writer).await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is visit() separate from run()?
//    - visit() only decides what happened to one URL and returns a Visit
//    - run() owns the side effects: writing records, counting, queueing
//    - Skips are ordinary values here, not errors
//
// 2. What is `let ... else`?
//    - `let Some(x) = expr else { return ...; };` binds x or leaves early
//    - It keeps the happy path unindented
//
// 3. Why Crawler<F, E> instead of a concrete client?
//    - F can be HttpFetcher in the CLI and an in-memory site in tests
//    - The compiler generates a specialized copy for each, no dynamic dispatch
// -----------------------------------------------------------------------------
