//! Data models for bibliographic records and their normalized representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawRecord`]: One matched document as returned by the search API
//! - [`SearchPage`]: One page of the API's JSON response body
//! - [`Entry`]: A normalized, immutable record ready for deduplication
//! - [`Title`]: Typed present/absent title state
//! - [`DedupKey`]: The `(title, year)` identity used to collapse duplicates
//! - [`TimePeriod`]: A closed year interval used for bucketing and counting
//!
//! The API is lenient about its own schema: documents may omit `title`, and
//! `first_publish_year` occasionally arrives as a string or not at all. The
//! serde definitions here absorb that without failing the whole page.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One raw matched document from the search API.
///
/// This struct represents a single item of a page's `docs` array before
/// normalization. Both fields are optional on the wire; everything else the
/// API sends alongside them is ignored.
///
/// # Fields
///
/// * `title` - The work's title, when the document carries one
/// * `first_publish_year` - First publication year, kept only when the
///   source field is a well-formed integer
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// The work's title as returned by the API.
    #[serde(default)]
    pub title: Option<String>,
    /// First publication year; `None` when missing or not an integer.
    #[serde(default, deserialize_with = "lenient_year")]
    pub first_publish_year: Option<i32>,
}

/// Accept an integer year and map anything else (strings like `"unknown"`,
/// floats, null) to `None` instead of failing deserialization.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .and_then(|year| i32::try_from(year).ok()))
}

/// One page of the search API's JSON response body.
///
/// The endpoint returns a record-count field plus an ordered array of matched
/// documents. `num_found` is the API's hint about the total result size
/// across all pages; the collector logs it on the first page of each query.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Total number of matches reported by the API for the whole query.
    #[serde(default, alias = "numFound")]
    pub num_found: u64,
    /// The matched documents on this page, in API order.
    #[serde(default)]
    pub docs: Vec<RawRecord>,
}

/// A title that is either known or absent.
///
/// The upstream data frequently omits titles. Rather than substituting a
/// sentinel string (which would collide with a real book titled "N/A"),
/// absence is a distinct typed state that still participates in
/// deduplication: two records with no title and the same year are treated
/// as the same book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Title {
    /// The document carried a title.
    Known(String),
    /// The document had no title field.
    Missing,
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Title::Known(title) => f.write_str(title),
            // "N/A" only exists at the output boundary, never as identity
            Title::Missing => f.write_str("N/A"),
        }
    }
}

/// A normalized bibliographic entry, immutable once created.
///
/// Entries are produced from [`RawRecord`]s by the keyword collector and flow
/// unchanged through deduplication, aggregation, and reporting. The
/// `keyword` field records which search term produced the entry; after
/// cross-keyword deduplication it reflects the first keyword, in submission
/// order, that surfaced the book.
///
/// Entries without a usable `year` are retained for title-level
/// deduplication but are never counted in any [`TimePeriod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The work's title, or its typed absent state.
    pub title: Title,
    /// First publication year, when the source field was a well-formed integer.
    pub year: Option<i32>,
    /// The search keyword that produced this entry.
    pub keyword: String,
}

impl Entry {
    /// Normalize one raw document under the keyword that matched it.
    pub fn from_record(record: RawRecord, keyword: &str) -> Self {
        Entry {
            title: match record.title {
                Some(title) => Title::Known(title),
                None => Title::Missing,
            },
            year: record.first_publish_year,
            keyword: keyword.to_string(),
        }
    }

    /// The `(title, year)` identity used for deduplication.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey(self.title.clone(), self.year)
    }
}

/// Identity tuple treating two entries as the same book.
///
/// Two entries with equal keys are the same book regardless of which keyword
/// produced them. An absent year is a comparable state, so no-year entries
/// still dedup against each other at title level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(pub Title, pub Option<i32>);

/// A closed interval `[start, end]` of publication years.
///
/// A configured partition is an ascending, non-overlapping list of these;
/// validation happens at startup in the config layer. Serializes to and from
/// a two-element sequence, so YAML configuration reads naturally:
///
/// ```yaml
/// counting_periods:
///   - [2002, 2003]
///   - [2004, 2005]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct TimePeriod {
    /// First year of the interval, inclusive.
    pub start: i32,
    /// Last year of the interval, inclusive.
    pub end: i32,
}

impl TimePeriod {
    /// Whether `year` falls inside this closed interval.
    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Human-facing label, e.g. `"2002-2003"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

impl From<(i32, i32)> for TimePeriod {
    fn from((start, end): (i32, i32)) -> Self {
        TimePeriod { start, end }
    }
}

impl From<TimePeriod> for (i32, i32) {
    fn from(period: TimePeriod) -> Self {
        (period.start, period.end)
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
