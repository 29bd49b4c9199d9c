// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Two subcommands:
// - crawl:   run the crawler and write the JSON-lines corpus
// - inspect: validate a corpus file and count its records per domain
//
// Every crawl flag is optional: without --config the built-in networking
// profile is used, and individual flags override whatever the profile says.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "topic-crawler",
    version = "0.1.0",
    about = "Crawl a fixed set of domains and collect clean page text",
    long_about = "topic-crawler walks a small allow-list of sites breadth-first, keeps to \
                  per-domain page quotas and content rules, and writes one JSON record per \
                  extracted page, ready to be chunked and indexed for retrieval."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the configured domains and write page records
    ///
    /// Example: topic-crawler crawl --config profile.json --output data/pages.jsonl
    Crawl {
        /// JSON crawl profile; the built-in networking profile is used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file for the JSON-lines records (truncated at start)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Seed URL; repeat to give several. Replaces the profile's seed list
        #[arg(long = "seed")]
        seeds: Vec<String>,

        /// Pause after every fetch, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Per-request timeout, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// User-Agent header sent with every request
        #[arg(long)]
        user_agent: Option<String>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,

        /// Print the end-of-run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a corpus file and summarize it
    ///
    /// Example: topic-crawler inspect data/raw_pages.jsonl
    Inspect {
        /// JSON-lines file written by `crawl`
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
