//! Command-line interface definitions for Book Census.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most knobs live in the YAML config file; the CLI covers output locations
//! and the overrides worth flipping per invocation.

use clap::Parser;

/// Command-line arguments for the Book Census application.
///
/// # Examples
///
/// ```sh
/// # Run with the compiled-in defaults, writing into ./output
/// book_census -o ./output -j ./output
///
/// # Run a custom keyword set
/// book_census -o ./output -j ./output --config census.yaml
///
/// # Point at a different search endpoint
/// book_census -o ./output -j ./output --endpoint http://localhost:8080/search.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the CSV tables
    #[arg(short = 'o', long, default_value = ".")]
    pub csv_output_dir: String,

    /// Output directory for the JSON summary
    #[arg(short, long, default_value = ".")]
    pub json_output_dir: String,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Search endpoint override
    #[arg(long, env = "BOOK_CENSUS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Worker pool size override
    #[arg(long)]
    pub max_workers: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(&["book_census"]);

        assert_eq!(cli.csv_output_dir, ".");
        assert_eq!(cli.json_output_dir, ".");
        assert_eq!(cli.config, None);
        assert_eq!(cli.max_workers, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(&["book_census", "-o", "/tmp/csv", "-j", "/tmp/json"]);

        assert_eq!(cli.csv_output_dir, "/tmp/csv");
        assert_eq!(cli.json_output_dir, "/tmp/json");
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(&[
            "book_census",
            "--config",
            "census.yaml",
            "--endpoint",
            "http://localhost:8080/search.json",
            "--max-workers",
            "4",
        ]);

        assert_eq!(cli.config.as_deref(), Some("census.yaml"));
        assert_eq!(
            cli.endpoint.as_deref(),
            Some("http://localhost:8080/search.json")
        );
        assert_eq!(cli.max_workers, Some(4));
    }
}
