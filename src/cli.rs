//! Command-line interface definitions for Headline Cloud.
//!
//! Flags cover the run itself (dates, concurrency, timeouts, output paths).
//! Word lists and scraping selectors live in the optional YAML file passed
//! with `--config`.

use crate::config::{FileConfig, PagePlan, PipelineConfig};
use crate::error::ConfigError;
use crate::models::DateRange;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the Headline Cloud application.
///
/// # Examples
///
/// ```sh
/// # One week of economy headlines
/// headline_cloud -s 2025-02-01 -e 2025-02-08
///
/// # With custom word lists and a word-cloud request for the renderer
/// headline_cloud -s 2025-02-01 -e 2025-02-08 -c words.yaml \
///     --font-path /usr/share/fonts/NanumGothic.ttf --cloud-spec ./cloud.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// First publication date to collect (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: NaiveDate,

    /// Last publication date to collect, inclusive (YYYY-MM-DD)
    #[arg(short, long)]
    pub end: NaiveDate,

    /// Output directory for the frequency JSON file
    #[arg(short, long, default_value = "./output")]
    pub output_dir: String,

    /// Optional path to a YAML config file with word lists and selectors
    #[arg(short, long, env = "HEADLINE_CLOUD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum concurrent page fetches (defaults to min(10, cores))
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// Extra attempts for timeouts and server errors
    #[arg(long, default_value_t = 0)]
    pub retries: usize,

    /// Fetch exactly this many pages per day instead of reading the pagination bar
    #[arg(long)]
    pub pages_per_day: Option<u32>,

    /// Minimum noun length in characters
    #[arg(long, default_value_t = 2)]
    pub min_token_len: usize,

    /// Remove this many of the most frequent terms (protected keywords are kept)
    #[arg(long, default_value_t = 5)]
    pub top_n_prune: usize,

    /// Listing URL with {date} (YYYYMMDD) and {page} placeholders
    #[arg(long)]
    pub url_pattern: Option<String>,

    /// Hangul-capable font for the word-cloud renderer
    #[arg(long, env = "HEADLINE_CLOUD_FONT")]
    pub font_path: Option<PathBuf>,

    /// Where to write the word-cloud request (requires --font-path)
    #[arg(long)]
    pub cloud_spec: Option<PathBuf>,

    /// Abandon the run after this many seconds, keeping what was counted
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

impl Cli {
    /// Build and validate the run configuration. Reads the YAML file if one
    /// was given; never touches the network.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let range = DateRange::new(self.start, self.end)?;
        let mut config = PipelineConfig::new(range);

        if let Some(path) = &self.config {
            config.apply_file(FileConfig::load(path)?);
        }
        if let Some(n) = self.concurrency {
            config.max_concurrency = n;
        }
        if let Some(n) = self.pages_per_day {
            config.pages = PagePlan::Fixed(n);
        }
        if let Some(pattern) = &self.url_pattern {
            config.url_pattern = pattern.clone();
        }
        config.fetch_timeout = Duration::from_secs(self.timeout_secs);
        config.retry.max_retries = self.retries;
        config.min_token_len = self.min_token_len;
        config.top_n_prune = self.top_n_prune;

        config.validate()?;
        Ok(config)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "headline_cloud",
            "--start",
            "2025-02-01",
            "--end",
            "2025-02-08",
        ]);

        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(cli.end, NaiveDate::from_ymd_opt(2025, 2, 8).unwrap());
        assert_eq!(cli.output_dir, "./output");
        assert_eq!(cli.timeout_secs, 5);
        assert_eq!(cli.deadline(), None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "headline_cloud",
            "-s",
            "2025-02-01",
            "-e",
            "2025-02-01",
            "-o",
            "/tmp/out",
        ]);

        assert_eq!(cli.output_dir, "/tmp/out");
        assert_eq!(cli.start, cli.end);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "headline_cloud",
            "-s",
            "2025-02-01",
            "-e",
            "2025-02-03",
            "--concurrency",
            "3",
            "--retries",
            "2",
            "--pages-per-day",
            "4",
            "--top-n-prune",
            "0",
        ]);
        let config = cli.pipeline_config().unwrap();

        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.pages, PagePlan::Fixed(4));
        assert_eq!(config.top_n_prune, 0);
        assert_eq!(config.date_range.day_count(), 3);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let cli = Cli::parse_from(["headline_cloud", "-s", "2025-02-08", "-e", "2025-02-01"]);
        assert!(matches!(
            cli.pipeline_config(),
            Err(ConfigError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cli = Cli::parse_from([
            "headline_cloud",
            "-s",
            "2025-02-01",
            "-e",
            "2025-02-01",
            "--timeout-secs",
            "0",
        ]);
        assert!(matches!(cli.pipeline_config(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_invalid_date_is_a_parse_error() {
        let result = Cli::try_parse_from(["headline_cloud", "-s", "2025-13-01", "-e", "2025-02-01"]);
        assert!(result.is_err());
    }
}
