//! JSON output for the reporting collaborator.
//!
//! Serializes the run [`Summary`] — totals, year range, keyword counts, both
//! period-count tables, and per-keyword statuses — to a date-stamped JSON
//! file for tabular or graphical rendering downstream.

use crate::report::Summary;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Summary`] to `{json_output_dir}/summary_{date}.json`.
///
/// Creates the output directory if needed. The date in the file name is the
/// run's `generated_on` date, so successive daily runs don't clobber each
/// other.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_summary(
    summary: &Summary,
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(summary)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = format!(
        "{}/summary_{}.json",
        json_output_dir.trim_end_matches('/'),
        summary.generated_on
    );
    info!(path = %path, "Writing JSON summary");
    fs::write(&path, json).await?;
    info!(path = %path, "Wrote JSON summary");

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::aggregate::{aggregate, bucket};
    use crate::collector::PartialResult;
    use crate::models::{Entry, TimePeriod, Title};
    use crate::report::summarize;

    #[test]
    fn test_summary_serializes_with_period_labels() {
        let table = aggregate(vec![PartialResult {
            keyword: "a".to_string(),
            index: 0,
            entries: vec![Entry {
                title: Title::Known("X".to_string()),
                year: Some(2005),
                keyword: "a".to_string(),
            }],
            pages_fetched: 1,
            error: None,
        }]);
        let periods: Vec<TimePeriod> = vec![(2004, 2005).into()];
        let counts = bucket(&table, &periods);
        let summary = summarize(&table, &counts, &counts, vec![]);

        let json = serde_json::to_string_pretty(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_entries"], 1);
        assert_eq!(value["counting_periods"][0]["period"], "2004-2005");
        assert_eq!(value["counting_periods"][0]["count"], 1);
        assert_eq!(value["keyword_counts"]["a"], 1);
    }
}
