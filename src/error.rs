// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Three families:
// - ConfigError: the crawl profile could not be loaded or is inconsistent
// - FetchError:  one URL could not be retrieved (never fatal to the run)
// - CrawlError:  the run itself cannot continue (client setup, output stream)
//
// The binary wraps all of these in anyhow::Error with extra context.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the crawl profile, detected before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no seed URLs configured")]
    NoSeeds,

    #[error("crawl target with an empty domain name")]
    EmptyDomain,

    #[error("domain '{0}' is configured more than once")]
    DuplicateDomain(String),
}

/// Why a single page could not be fetched.
///
/// Every variant is terminal for that URL only: the crawl loop logs it and
/// moves on to the next frontier entry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Errors that abort a whole crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("output stream error on {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
