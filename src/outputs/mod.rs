//! Output generation modules for the downstream collaborators.
//!
//! The pipeline itself stops at the aggregated table and the run summary;
//! these submodules serialize them for whoever consumes the run:
//!
//! - [`csv`]: the persistence collaborator — aggregated table and keyword
//!   counts as CSV files
//! - [`json`]: the reporting collaborator — the full run summary as JSON
//!
//! # Output Structure
//!
//! ```text
//! csv_output_dir/
//! ├── aggregated_books.csv         # Title, First Publish Year, Keyword
//! └── book_counts_by_keyword.csv   # Keyword, Count
//!
//! json_output_dir/
//! └── summary_2026-08-07.json      # statistics, period counts, statuses
//! ```

pub mod csv;
pub mod json;
