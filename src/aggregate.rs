//! Cross-keyword aggregation: global deduplication and period bucketing.
//!
//! The same book routinely matches several keywords, so after the per-keyword
//! passes the merged set is deduplicated once more, globally. "First
//! occurrence" is defined by keyword-submission order and then within-partial
//! order, which makes the final table reproducible no matter how the
//! concurrent collectors happened to finish.

use crate::collector::{PartialResult, dedup};
use crate::models::{Entry, TimePeriod};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// The final, globally deduplicated result set for one run.
///
/// Built once per run and read-only afterwards; every downstream consumer
/// (summary statistics, CSV rows, JSON report) works from this table.
#[derive(Debug)]
pub struct AggregatedTable {
    entries: Vec<Entry>,
}

impl AggregatedTable {
    /// The deduplicated entries, in deterministic merge order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts of table entries per configured time period.
pub type PeriodCounts = BTreeMap<TimePeriod, u64>;

/// Merge all partial results into one deduplicated table.
///
/// Partials are ordered by submission index before merging, so the entry
/// that survives a cross-keyword collision is always the one from the
/// earliest-configured keyword, regardless of which collector finished
/// first.
#[instrument(level = "info", skip_all, fields(partials = partials.len()))]
pub fn aggregate(mut partials: Vec<PartialResult>) -> AggregatedTable {
    partials.sort_by_key(|partial| partial.index);

    let merged_len: usize = partials.iter().map(|partial| partial.entries.len()).sum();
    let entries = dedup(partials.into_iter().flat_map(|partial| partial.entries));
    info!(
        merged = merged_len,
        unique = entries.len(),
        "Merged partial results into aggregated table"
    );

    AggregatedTable { entries }
}

/// Count table entries per period.
///
/// Each entry with a valid year increments the first period (in ascending
/// order) whose closed interval contains it. Periods are validated to be
/// non-overlapping at startup, so "first" is well-defined. Entries without
/// a usable year are skipped, not errors. Every configured period appears
/// in the result, zero or not.
pub fn bucket(table: &AggregatedTable, periods: &[TimePeriod]) -> PeriodCounts {
    let mut counts: PeriodCounts = periods.iter().map(|period| (*period, 0)).collect();

    for entry in table.entries() {
        let Some(year) = entry.year else { continue };
        if let Some(period) = periods.iter().find(|period| period.contains(year)) {
            *counts.entry(*period).or_insert(0) += 1;
        }
    }

    counts
}
