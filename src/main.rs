// src/main.rs
// =============================================================================
// Entry point of the topic-crawler CLI.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the crawl or inspect handler
// 4. Print a summary and exit with a proper code
//    (0 = success, 1 = invalid records found, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use topic_crawler::output::read_records;
use topic_crawler::{CrawlConfig, CrawlSummary};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Logs go to stderr so --json output on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,topic_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            config,
            output,
            seeds,
            delay_ms,
            timeout_secs,
            user_agent,
            no_progress,
            json,
        } => {
            let mut profile = match config {
                Some(path) => CrawlConfig::load(&path)
                    .with_context(|| format!("loading crawl profile {}", path.display()))?,
                None => CrawlConfig::default(),
            };

            apply_overrides(
                &mut profile,
                Overrides {
                    output,
                    seeds,
                    delay_ms,
                    timeout_secs,
                    user_agent,
                },
            );
            profile.validate().context("invalid crawl profile")?;

            handle_crawl(&profile, !no_progress, json).await
        }
        Commands::Inspect { file, json } => handle_inspect(&file, json),
    }
}

// Command-line values that take precedence over the profile
struct Overrides {
    output: Option<PathBuf>,
    seeds: Vec<String>,
    delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

fn apply_overrides(profile: &mut CrawlConfig, overrides: Overrides) {
    if let Some(output) = overrides.output {
        profile.output = output;
    }
    if !overrides.seeds.is_empty() {
        profile.seeds = overrides.seeds;
    }
    if let Some(delay_ms) = overrides.delay_ms {
        profile.delay_ms = delay_ms;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        profile.timeout_secs = timeout_secs;
    }
    if let Some(user_agent) = overrides.user_agent {
        profile.user_agent = user_agent;
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(profile: &CrawlConfig, progress: bool, json: bool) -> Result<i32> {
    println!(
        "🔍 Crawling {} domain(s) from {} seed(s)",
        profile.targets.len(),
        profile.seeds.len()
    );
    println!("📄 Writing records to {}", profile.output.display());

    let bar = if progress {
        create_progress_bar(profile.total_budget())?
    } else {
        ProgressBar::hidden()
    };

    let summary = topic_crawler::crawl(profile, bar)
        .await
        .context("crawl aborted")?;

    print_summary(&summary, &profile.output, json)?;
    Ok(0)
}

fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} pages {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn print_summary(summary: &CrawlSummary, output: &Path, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    println!("{:<40} {:>10}", "DOMAIN", "CRAWLED");
    println!("{}", "=".repeat(51));
    for (domain, count) in &summary.crawled {
        println!("{:<40} {:>10}", domain, count);
    }
    println!();

    println!("📊 Summary:");
    println!("   ✅ Written: {}", summary.written);
    println!("   📭 Empty: {}", summary.empty);
    println!("   ❌ Failed: {}", summary.failed);
    println!(
        "   ⏭️  Skipped: {} visited, {} off-target, {} over quota, {} filtered",
        summary.skipped.already_visited,
        summary.skipped.off_target,
        summary.skipped.quota_exhausted,
        summary.skipped.not_admitted
    );
    println!("   📁 Output: {}", output.display());
    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct InspectReport {
    records: usize,
    invalid: usize,
    domains: BTreeMap<String, usize>,
}

// Handles the 'inspect' subcommand
//
// Returns:
//   Ok(0) = every line is a valid record
//   Ok(1) = at least one line failed to parse or broke a record rule
fn handle_inspect(path: &Path, json: bool) -> Result<i32> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let mut report = InspectReport::default();
    for (line, record) in read_records(BufReader::new(file)).enumerate() {
        match record {
            Ok(record) if record.is_valid() => {
                report.records += 1;
                *report.domains.entry(record.domain).or_default() += 1;
            }
            Ok(record) => {
                tracing::warn!(line = line + 1, url = %record.url, "record breaks output rules");
                report.invalid += 1;
            }
            Err(e) => {
                tracing::warn!(line = line + 1, error = %e, "unreadable line");
                report.invalid += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:<40} {:>10}", "DOMAIN", "RECORDS");
        println!("{}", "=".repeat(51));
        for (domain, count) in &report.domains {
            println!("{:<40} {:>10}", domain, count);
        }
        println!();
        println!("📊 Summary:");
        println!("   ✅ Records: {}", report.records);
        println!("   ❌ Invalid: {}", report.invalid);
    }

    Ok(if report.invalid > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_replace_profile_values() {
        let mut profile = CrawlConfig::default();
        apply_overrides(
            &mut profile,
            Overrides {
                output: Some(PathBuf::from("out.jsonl")),
                seeds: vec!["https://a.test/x".to_string()],
                delay_ms: Some(0),
                timeout_secs: None,
                user_agent: Some("agent/2".to_string()),
            },
        );

        assert_eq!(profile.output, PathBuf::from("out.jsonl"));
        assert_eq!(profile.seeds, vec!["https://a.test/x"]);
        assert_eq!(profile.delay_ms, 0);
        assert_eq!(profile.timeout_secs, 25);
        assert_eq!(profile.user_agent, "agent/2");
    }

    #[test]
    fn test_empty_seed_override_keeps_profile_seeds() {
        let mut profile = CrawlConfig::default();
        let before = profile.seeds.clone();
        apply_overrides(
            &mut profile,
            Overrides {
                output: None,
                seeds: Vec::new(),
                delay_ms: None,
                timeout_secs: None,
                user_agent: None,
            },
        );
        assert_eq!(profile.seeds, before);
    }

    #[test]
    fn test_inspect_flags_invalid_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"url":"u1","title":"t","domain":"a.test","text":"x"}}"#).unwrap();
        writeln!(file, r#"{{"url":"u2","title":"t","domain":"a.test","text":""}}"#).unwrap();
        writeln!(file, "garbage").unwrap();

        assert_eq!(handle_inspect(file.path(), true).unwrap(), 1);
    }

    #[test]
    fn test_inspect_clean_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"url":"u1","title":"t","domain":"a.test","text":"x"}}"#).unwrap();
        writeln!(file, r#"{{"url":"u2","title":"t","domain":"b.test","text":"y"}}"#).unwrap();

        assert_eq!(handle_inspect(file.path(), false).unwrap(), 0);
    }
}
