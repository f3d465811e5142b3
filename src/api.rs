//! Search API interaction for paginated keyword queries.
//!
//! This module provides the interface for talking to the remote search
//! endpoint, one page per call. A call either yields an ordered page of raw
//! records (plus a hint whether more pages remain) or a terminal error for
//! that query's pagination loop.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`FetchPage`]: Core trait defining one paginated fetch
//! - [`HttpPageFetcher`]: Implementation backed by `reqwest`
//!
//! The trait seam exists so the pagination loop in the collector can be
//! exercised against scripted in-memory fetchers in tests.
//!
//! # Failure Policy
//!
//! There are no retries: any failure is terminal for the calling keyword's
//! pagination loop, which keeps whatever it accumulated so far. The only
//! resilience mechanism is the per-request timeout configured on the client.

use crate::models::{RawRecord, SearchPage};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Terminal outcomes for one page fetch.
///
/// Each variant ends the calling keyword's pagination loop; none of them
/// aborts the overall run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: DNS, refused connection, timeout.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("server returned status {0}")]
    Status(u16),

    /// The body was not JSON or did not match the expected schema.
    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// One successfully fetched page of search results.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The raw records on this page, in API order.
    pub records: Vec<RawRecord>,
    /// The API's count of total matches for the whole query.
    pub total_hint: u64,
    /// Whether another page is expected. True iff the page came back full;
    /// a short page means the query is exhausted.
    pub has_more: bool,
}

impl FetchedPage {
    /// A page with zero records, the explicit end-of-results signal.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait for fetching one page of search results.
///
/// Implementors take a query string and a 1-based page number and return the
/// page's records or a terminal [`FetchError`]. One network round trip per
/// call.
pub trait FetchPage {
    /// Fetch page `page` (>= 1) of results for `query`.
    async fn fetch(&self, query: &str, page: u32) -> Result<FetchedPage, FetchError>;
}

/// [`FetchPage`] implementation backed by an HTTP client.
///
/// Issues `GET {endpoint}?title={query}&limit={page_size}&page={page}` and
/// decodes the JSON body into a [`SearchPage`]. The client carries the
/// configured per-request timeout and user agent.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    endpoint: Url,
    page_size: usize,
}

impl HttpPageFetcher {
    /// Build a fetcher with its own HTTP client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The search endpoint URL
    /// * `user_agent` - User agent header sent with every request
    /// * `timeout` - Per-request timeout; a request exceeding it fails with
    ///   [`FetchError::Transport`]
    /// * `page_size` - Fixed number of records requested per page
    pub fn new(
        endpoint: Url,
        user_agent: &str,
        timeout: Duration,
        page_size: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpPageFetcher {
            client,
            endpoint,
            page_size,
        })
    }
}

impl FetchPage for HttpPageFetcher {
    #[instrument(level = "info", skip(self), fields(query = %query, page))]
    async fn fetch(&self, query: &str, page: u32) -> Result<FetchedPage, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("title", query)])
            .query(&[("limit", self.page_size as u64), ("page", u64::from(page))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body_preview = %truncate_for_log(&body, 300),
                "Search request rejected"
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.json::<SearchPage>().await?;
        let dt = t0.elapsed();
        let fetched = page_from_body(body, self.page_size);
        debug!(
            records = fetched.records.len(),
            has_more = fetched.has_more,
            elapsed_ms = dt.as_millis() as u128,
            "Fetched search page"
        );
        Ok(fetched)
    }
}

/// Derive the page outcome from a decoded body.
///
/// "Has more" is true iff the returned count equals the requested page size;
/// anything shorter means the query is exhausted.
fn page_from_body(body: SearchPage, page_size: usize) -> FetchedPage {
    let has_more = body.docs.len() == page_size;
    FetchedPage {
        records: body.docs,
        total_hint: body.num_found,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with(count: usize) -> SearchPage {
        let docs = format!(
            "[{}]",
            (0..count)
                .map(|i| format!(r#"{{"title": "Book {i}"}}"#))
                .collect::<Vec<_>>()
                .join(",")
        );
        serde_json::from_str(&format!(r#"{{"numFound": 2400, "docs": {docs}}}"#)).unwrap()
    }

    #[test]
    fn test_full_page_has_more() {
        let page = page_from_body(body_with(1000), 1000);
        assert_eq!(page.records.len(), 1000);
        assert!(page.has_more);
        assert!(!page.is_empty());
    }

    #[test]
    fn test_short_page_is_last() {
        let page = page_from_body(body_with(400), 1000);
        assert_eq!(page.records.len(), 400);
        assert!(!page.has_more);
    }

    #[test]
    fn test_empty_page_signals_exhaustion() {
        let page = page_from_body(body_with(0), 1000);
        assert!(page.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_total_hint_carried_through() {
        let page = page_from_body(body_with(3), 1000);
        assert_eq!(page.total_hint, 2400);
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(
            FetchError::Status(503).to_string(),
            "server returned status 503"
        );
        assert_eq!(
            FetchError::Transport("timed out".to_string()).to_string(),
            "network error: timed out"
        );
    }
}
