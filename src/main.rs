//! # Book Census
//!
//! A keyword-driven harvest of bibliographic records from the Open Library
//! search API. For every configured keyword the pipeline walks the paginated
//! search results, normalizes and deduplicates the matches, merges them into
//! one globally deduplicated table, and buckets publication years into
//! configured time periods for summary reporting.
//!
//! ## Features
//!
//! - Concurrent keyword harvesting under a fixed worker cap (24 at a time)
//! - Per-keyword and global deduplication by `(title, year)`
//! - Two independent period partitions: 2-year counting bins and decade
//!   display bins
//! - CSV output of the aggregated table and per-keyword counts, JSON output
//!   of the full run summary
//! - Graceful degradation: a failed keyword keeps its partial results and
//!   is reported in the run summary, never aborting the run
//!
//! ## Usage
//!
//! ```sh
//! book_census -o ./output -j ./output
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Collection**: Walk every keyword's result pages (parallel, capped)
//! 2. **Aggregation**: Merge partial results, dedup globally
//! 3. **Bucketing**: Count entries per configured time period
//! 4. **Output**: Write CSV tables and the JSON run summary

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod api;
mod cli;
mod collector;
mod config;
mod models;
mod outputs;
mod report;
mod scheduler;
mod utils;

use api::HttpPageFetcher;
use cli::Cli;
use config::Config;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("book_census starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.csv_output_dir, ?args.json_output_dir, "Parsed CLI arguments");

    // --- Load and validate configuration ---
    let mut config = match args.config.as_deref() {
        Some(path) => match Config::load(path) {
            Ok(config) => {
                info!(config_path = path, "Loaded configuration");
                config
            }
            Err(e) => {
                error!(config_path = path, error = %e, "Configuration rejected");
                return Err(e.into());
            }
        },
        None => Config::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(max_workers) = args.max_workers {
        config.max_workers = max_workers;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration rejected");
        return Err(e.into());
    }

    // Early check: ensure output dirs are writable before any network work
    if let Err(e) = ensure_writable_dir(&args.csv_output_dir).await {
        error!(
            path = %args.csv_output_dir,
            error = %e,
            "CSV output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Build the page fetcher ----
    let endpoint = config.endpoint_url()?;
    let fetcher = HttpPageFetcher::new(
        endpoint,
        &config.user_agent,
        config.request_timeout(),
        config.page_size,
    )?;

    info!(
        keywords = config.keywords.len(),
        max_workers = config.max_workers,
        page_size = config.page_size,
        timeout_secs = config.request_timeout_secs,
        "Starting keyword harvest"
    );

    // ---- Collect all keywords under the worker cap ----
    let partials = scheduler::run(&fetcher, &config.keywords, config.max_workers).await;
    let statuses = report::keyword_statuses(&partials);

    let collected: usize = partials.iter().map(|p| p.entries.len()).sum();
    let truncated = statuses.iter().filter(|s| s.truncated).count();
    info!(
        keywords = partials.len(),
        entries = collected,
        truncated,
        "Keyword collection completed"
    );

    // ---- Aggregate, bucket, summarize ----
    let table = aggregate::aggregate(partials);
    if table.is_empty() {
        info!("No entries collected from any keyword");
    }
    let counting_counts = aggregate::bucket(&table, &config.counting_periods);
    let display_counts = aggregate::bucket(&table, &config.display_periods);

    let summary = report::summarize(&table, &counting_counts, &display_counts, statuses);
    report::log_summary(&summary);

    // ---- Outputs ----
    if let Err(e) = outputs::csv::write_aggregated_table(&table, &args.csv_output_dir).await {
        error!(error = %e, "Failed to write aggregated books CSV");
    }
    if let Err(e) =
        outputs::csv::write_keyword_counts(&summary.keyword_counts, &args.csv_output_dir).await
    {
        error!(error = %e, "Failed to write keyword counts CSV");
    }
    if let Err(e) = outputs::json::write_summary(&summary, &args.json_output_dir).await {
        error!(error = %e, "Failed to write JSON summary");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
