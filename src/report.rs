//! Run summary: statistics, per-keyword counts, and the keyword status report.
//!
//! Consumes the aggregated table read-only and produces the material handed
//! to the downstream CSV and JSON collaborators, plus the console report
//! logged at the end of a run.

use crate::aggregate::{AggregatedTable, PeriodCounts};
use crate::collector::PartialResult;
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One period's count, labeled for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodCountRow {
    /// Human-facing interval label, e.g. `"2004-2005"`.
    pub period: String,
    pub start: i32,
    pub end: i32,
    pub count: u64,
}

/// How one keyword's collection went.
///
/// Surfaced alongside the aggregated data so a truncated keyword is visible
/// in the run output instead of only in a log line.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordStatus {
    pub keyword: String,
    pub pages_fetched: u32,
    /// Deduplicated entries this keyword contributed before the global merge.
    pub entries: usize,
    /// True when pagination stopped on a failure rather than exhaustion.
    pub truncated: bool,
    pub error: Option<String>,
}

/// Everything the reporting collaborators consume: totals, year range,
/// per-keyword occurrence counts, both period-count tables, and per-keyword
/// collection statuses.
///
/// Keyword counts are computed from the keyword tag retained per entry, so
/// after cross-keyword deduplication they reflect first-seen keywords only.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// Local date the run finished, `YYYY-MM-DD`.
    pub generated_on: String,
    pub total_entries: usize,
    pub entries_with_year: usize,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    pub keyword_counts: BTreeMap<String, u64>,
    pub counting_periods: Vec<PeriodCountRow>,
    pub display_periods: Vec<PeriodCountRow>,
    pub keyword_statuses: Vec<KeywordStatus>,
}

/// Build the run summary from the aggregated table and both bucketings.
pub fn summarize(
    table: &AggregatedTable,
    counting: &PeriodCounts,
    display: &PeriodCounts,
    statuses: Vec<KeywordStatus>,
) -> Summary {
    let years: Vec<i32> = table.entries().iter().filter_map(|entry| entry.year).collect();

    let mut keyword_counts: BTreeMap<String, u64> = BTreeMap::new();
    for entry in table.entries() {
        *keyword_counts.entry(entry.keyword.clone()).or_insert(0) += 1;
    }

    Summary {
        generated_on: Local::now().date_naive().to_string(),
        total_entries: table.len(),
        entries_with_year: years.len(),
        earliest_year: years.iter().min().copied(),
        latest_year: years.iter().max().copied(),
        keyword_counts,
        counting_periods: period_rows(counting),
        display_periods: period_rows(display),
        keyword_statuses: statuses,
    }
}

/// Flatten a period-count map into labeled rows, ascending by period.
pub fn period_rows(counts: &PeriodCounts) -> Vec<PeriodCountRow> {
    counts
        .iter()
        .map(|(period, count)| PeriodCountRow {
            period: period.label(),
            start: period.start,
            end: period.end,
            count: *count,
        })
        .collect()
}

/// Derive per-keyword statuses from the collected partials, in submission
/// order.
pub fn keyword_statuses(partials: &[PartialResult]) -> Vec<KeywordStatus> {
    let mut indexed: Vec<(usize, KeywordStatus)> = partials
        .iter()
        .map(|partial| {
            let status = KeywordStatus {
                keyword: partial.keyword.clone(),
                pages_fetched: partial.pages_fetched,
                entries: partial.entries.len(),
                truncated: partial.truncated(),
                error: partial.error.as_ref().map(|e| e.to_string()),
            };
            (partial.index, status)
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, status)| status).collect()
}

/// Log the end-of-run report the way a human wants to read it.
pub fn log_summary(summary: &Summary) {
    info!(
        total = summary.total_entries,
        with_year = summary.entries_with_year,
        earliest = ?summary.earliest_year,
        latest = ?summary.latest_year,
        "Aggregated table statistics"
    );

    for row in &summary.counting_periods {
        info!(period = %row.period, count = row.count, "Books per time period");
    }

    for (keyword, count) in &summary.keyword_counts {
        info!(keyword = %keyword, count = *count, "Books per keyword");
    }

    for status in &summary.keyword_statuses {
        if status.truncated {
            warn!(
                keyword = %status.keyword,
                pages = status.pages_fetched,
                entries = status.entries,
                error = status.error.as_deref().unwrap_or("unknown"),
                "Keyword returned partial data"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, bucket};
    use crate::api::FetchError;
    use crate::models::{Entry, TimePeriod, Title};

    fn entry(title: &str, year: Option<i32>, keyword: &str) -> Entry {
        Entry {
            title: Title::Known(title.to_string()),
            year,
            keyword: keyword.to_string(),
        }
    }

    fn partial(keyword: &str, index: usize, entries: Vec<Entry>) -> PartialResult {
        PartialResult {
            keyword: keyword.to_string(),
            index,
            entries,
            pages_fetched: 1,
            error: None,
        }
    }

    #[test]
    fn test_summary_statistics() {
        let table = aggregate(vec![
            partial("a", 0, vec![entry("X", Some(2005), "a"), entry("W", None, "a")]),
            partial("b", 1, vec![entry("X", Some(2005), "b"), entry("Y", Some(2010), "b")]),
        ]);
        let periods: Vec<TimePeriod> = vec![(2004, 2005).into(), (2006, 2011).into()];
        let counting = bucket(&table, &periods);
        let display = bucket(&table, &periods);

        let summary = summarize(&table, &counting, &display, vec![]);

        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.entries_with_year, 2);
        assert_eq!(summary.earliest_year, Some(2005));
        assert_eq!(summary.latest_year, Some(2010));
        // X/2005 deduped to keyword "a", so "b" only keeps Y
        assert_eq!(summary.keyword_counts["a"], 2);
        assert_eq!(summary.keyword_counts["b"], 1);
    }

    #[test]
    fn test_summary_of_empty_table() {
        let table = aggregate(vec![]);
        let periods: Vec<TimePeriod> = vec![(2004, 2005).into()];
        let counting = bucket(&table, &periods);
        let display = bucket(&table, &periods);

        let summary = summarize(&table, &counting, &display, vec![]);

        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.earliest_year, None);
        assert_eq!(summary.latest_year, None);
        assert_eq!(summary.counting_periods.len(), 1);
        assert_eq!(summary.counting_periods[0].count, 0);
    }

    #[test]
    fn test_period_rows_are_labeled_and_ascending() {
        let table = aggregate(vec![partial("a", 0, vec![entry("X", Some(2005), "a")])]);
        let periods: Vec<TimePeriod> = vec![(2004, 2005).into(), (2006, 2011).into()];
        let rows = period_rows(&bucket(&table, &periods));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2004-2005");
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[1].period, "2006-2011");
        assert_eq!(rows[1].count, 0);
    }

    #[test]
    fn test_keyword_statuses_record_truncation() {
        let ok = partial("a", 0, vec![entry("X", Some(2005), "a")]);
        let failed = PartialResult {
            keyword: "b".to_string(),
            index: 1,
            entries: vec![],
            pages_fetched: 2,
            error: Some(FetchError::Transport("timed out".to_string())),
        };

        let statuses = keyword_statuses(&[ok, failed]);

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].keyword, "a");
        assert!(!statuses[0].truncated);
        assert!(statuses[1].truncated);
        assert_eq!(statuses[1].error.as_deref(), Some("network error: timed out"));
    }
}
