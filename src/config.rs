//! Run configuration: keywords, partitions, pool sizing, endpoint.
//!
//! Configuration is loaded from an optional YAML file; any field left out
//! falls back to the compiled-in defaults. All validation happens up front,
//! before any network work: a bad configuration is the one fatal error class
//! in the pipeline.

use crate::models::TimePeriod;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Fatal configuration problems, surfaced before any fetching begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("keyword list is empty")]
    EmptyKeywords,

    #[error("keyword list contains a blank keyword")]
    BlankKeyword,

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("{name} partition is empty")]
    EmptyPartition { name: &'static str },

    #[error("{name} partition has period {start}-{end} with start after end")]
    InvalidPeriod { name: &'static str, start: i32, end: i32 },

    #[error("{name} partition is not ascending and non-overlapping around {start}-{end}")]
    UnorderedPartition { name: &'static str, start: i32, end: i32 },

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("worker pool size must be at least 1")]
    ZeroWorkers,

    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Everything a run needs: the keyword list, the two period partitions, and
/// the fetch parameters.
///
/// The counting partition (2-year bins) and the display partition (decade
/// bins) are deliberately independent configurations; reports carry both.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Search keywords, in submission order.
    pub keywords: Vec<String>,
    /// Search endpoint URL.
    pub endpoint: String,
    /// User agent header sent with every request.
    pub user_agent: String,
    /// Records requested per page; "has more" means a page came back full.
    pub page_size: usize,
    /// Maximum keyword pipelines in flight at once.
    pub max_workers: usize,
    /// Per-request timeout in seconds. No retries on expiry.
    pub request_timeout_secs: u64,
    /// Fine-grained partition used for period counting.
    pub counting_periods: Vec<TimePeriod>,
    /// Coarse partition used for display bucketing.
    pub display_periods: Vec<TimePeriod>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keywords: [
                "Machine Learning",
                "Artificial Intelligence",
                "Deep Learning",
                "Neural Networks",
                "Natural Language Processing",
                "Computer Vision",
                "Reinforcement Learning",
                "Generative Adversarial Networks",
                "Supervised Learning",
                "Data Science",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            endpoint: "https://openlibrary.org/search.json".to_string(),
            user_agent: concat!("book_census/", env!("CARGO_PKG_VERSION")).to_string(),
            page_size: 1000,
            max_workers: 24,
            request_timeout_secs: 3,
            counting_periods: vec![
                (2002, 2003).into(),
                (2004, 2005).into(),
                (2006, 2007).into(),
                (2008, 2009).into(),
                (2010, 2011).into(),
                (2012, 2013).into(),
                (2014, 2015).into(),
                (2016, 2017).into(),
                (2018, 2019).into(),
                (2020, 2021).into(),
                (2022, 2023).into(),
            ],
            display_periods: vec![
                (1913, 1922).into(),
                (1923, 1932).into(),
                (1933, 1942).into(),
                (1943, 1952).into(),
                (1953, 1962).into(),
                (1963, 1972).into(),
                (1973, 1982).into(),
                (1983, 1992).into(),
                (1993, 2002).into(),
                (2003, 2012).into(),
                (2013, 2023).into(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from a YAML file and validate it.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every startup invariant. Any failure here aborts the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords);
        }
        if self.keywords.iter().any(|kw| kw.trim().is_empty()) {
            return Err(ConfigError::BlankKeyword);
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.endpoint_url()?;
        validate_partition("counting_periods", &self.counting_periods)?;
        validate_partition("display_periods", &self.display_periods)?;
        Ok(())
    }

    /// The endpoint parsed as a URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.endpoint)?)
    }

    /// The per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// A partition must be non-empty, each period well-formed, and the whole
/// list ascending with no overlap between neighbors.
fn validate_partition(name: &'static str, periods: &[TimePeriod]) -> Result<(), ConfigError> {
    if periods.is_empty() {
        return Err(ConfigError::EmptyPartition { name });
    }
    for period in periods {
        if period.start > period.end {
            return Err(ConfigError::InvalidPeriod {
                name,
                start: period.start,
                end: period.end,
            });
        }
    }
    for pair in periods.windows(2) {
        if pair[1].start <= pair[0].end {
            return Err(ConfigError::UnorderedPartition {
                name,
                start: pair[1].start,
                end: pair[1].end,
            });
        }
    }
    Ok(())
}
