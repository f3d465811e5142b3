//! Per-keyword collection: pagination, normalization, local deduplication.
//!
//! One collector run drives the page fetcher for a single keyword until the
//! query is exhausted, normalizes the raw documents into [`Entry`] values,
//! and deduplicates them before anything is merged across keywords.
//!
//! A fetch failure does not surface as an error: the keyword keeps whatever
//! it accumulated up to that point, and the failure is recorded on the
//! [`PartialResult`] for the run summary.

use crate::api::{FetchError, FetchPage};
use crate::models::Entry;
use itertools::Itertools;
use tracing::{info, instrument, warn};

/// The deduplicated result of one keyword's collection run.
///
/// Owned exclusively by the scheduler until it is merged into the aggregated
/// table. `index` records the keyword's position in the submission order,
/// which downstream merging uses to stay deterministic regardless of
/// completion order.
#[derive(Debug)]
pub struct PartialResult {
    /// The keyword this result belongs to.
    pub keyword: String,
    /// Position of the keyword in the configured submission order.
    pub index: usize,
    /// Deduplicated entries in first-seen order.
    pub entries: Vec<Entry>,
    /// Number of pages successfully retrieved (including an empty last page).
    pub pages_fetched: u32,
    /// The terminal error, when pagination stopped early. The entries above
    /// are still valid; they are simply a truncated prefix.
    pub error: Option<FetchError>,
}

impl PartialResult {
    /// Whether pagination ended on a failure rather than exhaustion.
    pub fn truncated(&self) -> bool {
        self.error.is_some()
    }
}

/// Collect every result page for one keyword.
///
/// Starts at page 1 and keeps fetching while pages come back full. Stops on
/// the first empty page, short page, or error. Raw records are normalized
/// into entries and deduplicated by `(title, year)` in first-seen order
/// before returning.
#[instrument(level = "info", skip(fetcher), fields(keyword = %keyword))]
pub async fn collect<F: FetchPage>(fetcher: &F, keyword: &str, index: usize) -> PartialResult {
    let mut records = Vec::new();
    let mut pages_fetched = 0u32;
    let mut error = None;
    let mut page = 1u32;

    loop {
        match fetcher.fetch(keyword, page).await {
            Ok(fetched) => {
                pages_fetched += 1;
                if page == 1 {
                    info!(total_hint = fetched.total_hint, "Search reported total matches");
                }
                if fetched.is_empty() {
                    break;
                }
                let has_more = fetched.has_more;
                records.extend(fetched.records);
                if !has_more {
                    break;
                }
                page += 1;
            }
            Err(e) => {
                warn!(error = %e, page, "Pagination stopped early; keeping partial results");
                error = Some(e);
                break;
            }
        }
    }

    let entries = dedup(records.into_iter().map(|record| Entry::from_record(record, keyword)));
    info!(
        entries = entries.len(),
        pages = pages_fetched,
        truncated = error.is_some(),
        "Keyword collection finished"
    );

    PartialResult {
        keyword: keyword.to_string(),
        index,
        entries,
        pages_fetched,
        error,
    }
}

/// Deduplicate entries by [`DedupKey`](crate::models::DedupKey), preserving
/// first-seen order.
///
/// Pure function over its input sequence; used both here for the per-keyword
/// pass and by the aggregator for the global pass, so there is exactly one
/// definition of "duplicate" in the pipeline.
pub fn dedup<I: IntoIterator<Item = Entry>>(entries: I) -> Vec<Entry> {
    entries.into_iter().unique_by(|entry| entry.dedup_key()).collect()
}
