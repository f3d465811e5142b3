//! CSV output for the persistence collaborator.
//!
//! Writes the final deduplicated table as rows of
//! `Title, First Publish Year, Keyword`, and the per-keyword occurrence
//! counts as `Keyword, Count`. A missing year serializes as an empty field;
//! a missing title serializes as "N/A" — that sentinel exists only here at
//! the output boundary, never as identity inside the pipeline.

use crate::aggregate::AggregatedTable;
use std::collections::BTreeMap;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// File name for the aggregated, deduplicated table.
pub const AGGREGATED_FILENAME: &str = "aggregated_books.csv";
/// File name for the per-keyword counts table.
pub const KEYWORD_COUNTS_FILENAME: &str = "book_counts_by_keyword.csv";

/// Encode the aggregated table as CSV bytes.
fn table_to_csv(table: &AggregatedTable) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Title", "First Publish Year", "Keyword"])?;
    for entry in table.entries() {
        let title = entry.title.to_string();
        let year = entry.year.map(|y| y.to_string()).unwrap_or_default();
        writer.write_record([title.as_str(), year.as_str(), entry.keyword.as_str()])?;
    }
    Ok(writer.into_inner()?)
}

/// Encode the per-keyword counts as CSV bytes.
fn keyword_counts_to_csv(counts: &BTreeMap<String, u64>) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Keyword", "Count"])?;
    for (keyword, count) in counts {
        let count = count.to_string();
        writer.write_record([keyword.as_str(), count.as_str()])?;
    }
    Ok(writer.into_inner()?)
}

/// Write the aggregated table to `{csv_output_dir}/aggregated_books.csv`.
#[instrument(level = "info", skip_all, fields(csv_output_dir = %csv_output_dir))]
pub async fn write_aggregated_table(
    table: &AggregatedTable,
    csv_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let bytes = table_to_csv(table)?;
    let path = format!(
        "{}/{}",
        csv_output_dir.trim_end_matches('/'),
        AGGREGATED_FILENAME
    );
    fs::write(&path, bytes).await?;
    info!(path = %path, rows = table.len(), "Wrote aggregated books CSV");
    Ok(())
}

/// Write the keyword counts to `{csv_output_dir}/book_counts_by_keyword.csv`.
#[instrument(level = "info", skip_all, fields(csv_output_dir = %csv_output_dir))]
pub async fn write_keyword_counts(
    counts: &BTreeMap<String, u64>,
    csv_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let bytes = keyword_counts_to_csv(counts)?;
    let path = format!(
        "{}/{}",
        csv_output_dir.trim_end_matches('/'),
        KEYWORD_COUNTS_FILENAME
    );
    fs::write(&path, bytes).await?;
    info!(path = %path, rows = counts.len(), "Wrote keyword counts CSV");
    Ok(())
}
