//! Bounded concurrent fan-out of keyword collectors.
//!
//! One collector runs per configured keyword, with at most `max_workers`
//! in flight at a time to bound simultaneous outbound connections. An idle
//! slot picks up the next keyword as soon as one finishes.
//!
//! The returned set is complete (one [`PartialResult`] per keyword) but its
//! order reflects completion, not submission. Collectors share no mutable
//! state; the only synchronization point is the fan-in barrier at the end.
//! A failed keyword yields a possibly-truncated partial and does not affect
//! the rest of the pool.

use crate::api::FetchPage;
use crate::collector::{self, PartialResult};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

/// Run one collector per keyword under a fixed concurrency cap.
///
/// # Arguments
///
/// * `fetcher` - Shared page fetcher; collectors only read from it
/// * `keywords` - The configured keyword list, in submission order
/// * `max_workers` - Maximum keyword pipelines in flight (clamped to >= 1)
#[instrument(level = "info", skip_all, fields(keywords = keywords.len(), max_workers))]
pub async fn run<F: FetchPage>(
    fetcher: &F,
    keywords: &[String],
    max_workers: usize,
) -> Vec<PartialResult> {
    let cap = max_workers.max(1);

    let partials: Vec<PartialResult> = stream::iter(keywords.iter().enumerate())
        .map(|(index, keyword)| async move { collector::collect(fetcher, keyword, index).await })
        .buffer_unordered(cap)
        .collect()
        .await;

    let truncated = partials.iter().filter(|p| p.truncated()).count();
    info!(
        collected = partials.len(),
        truncated,
        "All keyword collectors finished"
    );
    partials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchError, FetchedPage};
    use crate::models::RawRecord;
    use std::collections::HashMap;

    /// Serves one short page per keyword from a fixed table.
    struct TableFetcher {
        pages: HashMap<String, Vec<RawRecord>>,
    }

    impl FetchPage for TableFetcher {
        async fn fetch(&self, query: &str, _page: u32) -> Result<FetchedPage, FetchError> {
            let records = self.pages.get(query).cloned().unwrap_or_default();
            Ok(FetchedPage {
                records,
                total_hint: 0,
                has_more: false,
            })
        }
    }

    fn fetcher_for(keywords: &[&str]) -> TableFetcher {
        let pages = keywords
            .iter()
            .map(|kw| {
                let records = vec![RawRecord {
                    title: Some(format!("{kw} Handbook")),
                    first_publish_year: Some(2015),
                }];
                (kw.to_string(), records)
            })
            .collect();
        TableFetcher { pages }
    }

    #[tokio::test]
    async fn test_one_partial_per_keyword() {
        let keywords: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let fetcher = fetcher_for(&["a", "b", "c", "d"]);

        let partials = run(&fetcher, &keywords, 24).await;

        assert_eq!(partials.len(), 4);
        let mut seen: Vec<&str> = partials.iter().map(|p| p.keyword.as_str()).collect();
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_indexes_follow_submission_order() {
        let keywords: Vec<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let fetcher = fetcher_for(&["x", "y"]);

        let mut partials = run(&fetcher, &keywords, 2).await;
        partials.sort_by_key(|p| p.index);

        assert_eq!(partials[0].keyword, "x");
        assert_eq!(partials[0].index, 0);
        assert_eq!(partials[1].keyword, "y");
        assert_eq!(partials[1].index, 1);
    }

    #[tokio::test]
    async fn test_zero_cap_is_clamped() {
        let keywords = vec!["a".to_string()];
        let fetcher = fetcher_for(&["a"]);

        let partials = run(&fetcher, &keywords, 0).await;
        assert_eq!(partials.len(), 1);
    }

    #[tokio::test]
    async fn test_pool_narrower_than_keyword_list_completes() {
        let names: Vec<String> = (0..10).map(|i| format!("kw{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let fetcher = fetcher_for(&refs);

        let partials = run(&fetcher, &names, 3).await;
        assert_eq!(partials.len(), 10);
    }
}
