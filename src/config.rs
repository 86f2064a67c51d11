//! Run configuration.
//!
//! A [`PipelineConfig`] is assembled once from CLI flags and an optional YAML
//! file, validated, and then shared read-only by every stage. Word lists are
//! ordinary fields here, so tests can build a pipeline with any lists they
//! like.
//!
//! # YAML file
//!
//! ```yaml
//! stopwords: [속보, 단독]
//! replace_default_stopwords: false
//! excluded_keywords: [코스피]
//! protected_keywords: [트럼프, 관세]
//! proper_nouns: [하이닉스, 고려아연]
//! headline_selector: ".list_body.newsflash_body li dt:not(.photo) a"
//! paging_selector: ".paging a"
//! user_agent: "Mozilla/5.0"
//! max_pages_per_day: 50
//! fallback_last_page: 5
//! dedupe_headlines: true
//! ```

use crate::analysis::filter::{ExcludedKeywordSet, StopwordSet, TermSet};
use crate::error::ConfigError;
use crate::fetch::{FetchSettings, RetryPolicy};
use crate::models::DateRange;
use crate::scrapers::naver::{
    DEFAULT_HEADLINE_SELECTOR, DEFAULT_PAGING_SELECTOR, DEFAULT_URL_PATTERN, validate_url_pattern,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// How many listing pages are requested per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePlan {
    /// Exactly this many pages per day, all requested up front.
    Fixed(u32),
    /// Request page 1, then the pages its pagination bar advertises.
    Discover {
        /// Last page assumed when page 1 shows no pagination bar.
        fallback_last_page: u32,
        /// Upper bound on the discovered last page.
        max_pages: u32,
    },
}

impl Default for PagePlan {
    fn default() -> Self {
        PagePlan::Discover {
            fallback_last_page: 5,
            max_pages: 50,
        }
    }
}

/// Settings read from the optional YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub stopwords: Vec<String>,
    /// Use `stopwords` instead of the default preset rather than adding to it.
    pub replace_default_stopwords: bool,
    pub excluded_keywords: Vec<String>,
    pub protected_keywords: Option<Vec<String>>,
    pub proper_nouns: Vec<String>,
    pub headline_selector: Option<String>,
    pub paging_selector: Option<String>,
    pub user_agent: Option<String>,
    pub max_pages_per_day: Option<u32>,
    pub fallback_last_page: Option<u32>,
    pub dedupe_headlines: Option<bool>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            stopwords = file.stopwords.len(),
            excluded = file.excluded_keywords.len(),
            "Loaded config file"
        );
        Ok(file)
    }
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub date_range: DateRange,
    pub url_pattern: String,
    pub max_concurrency: usize,
    pub fetch_timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
    pub pages: PagePlan,
    /// Minimum noun length in characters.
    pub min_token_len: usize,
    pub stopwords: StopwordSet,
    pub excluded_keywords: ExcludedKeywordSet,
    /// Terms exempt from top-N pruning.
    pub protected_keywords: TermSet,
    pub proper_nouns: Vec<String>,
    /// Most frequent terms removed from the final table (0 disables).
    pub top_n_prune: usize,
    pub dedupe_headlines: bool,
    pub headline_selector: String,
    pub paging_selector: String,
}

/// `min(10, available cores)`, or 4 when the core count is unknown.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(10)
}

impl PipelineConfig {
    /// Defaults for `date_range`, with the Korean news stopword preset and
    /// protected keyword preset.
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            url_pattern: DEFAULT_URL_PATTERN.to_string(),
            max_concurrency: default_concurrency(),
            fetch_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            user_agent: "Mozilla/5.0".to_string(),
            pages: PagePlan::default(),
            min_token_len: 2,
            stopwords: TermSet::korean_news_stopwords(),
            excluded_keywords: TermSet::new(),
            protected_keywords: TermSet::protected_keywords(),
            proper_nouns: Vec::new(),
            top_n_prune: 5,
            dedupe_headlines: true,
            headline_selector: DEFAULT_HEADLINE_SELECTOR.to_string(),
            paging_selector: DEFAULT_PAGING_SELECTOR.to_string(),
        }
    }

    /// Layer the YAML file settings over the current values.
    pub fn apply_file(&mut self, file: FileConfig) {
        if file.replace_default_stopwords {
            self.stopwords = file.stopwords.iter().collect();
        } else {
            self.stopwords.extend(&file.stopwords);
        }
        self.excluded_keywords.extend(&file.excluded_keywords);
        if let Some(protected) = file.protected_keywords {
            self.protected_keywords = protected.iter().collect();
        }
        self.proper_nouns.extend(file.proper_nouns);
        if let Some(selector) = file.headline_selector {
            self.headline_selector = selector;
        }
        if let Some(selector) = file.paging_selector {
            self.paging_selector = selector;
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(dedupe) = file.dedupe_headlines {
            self.dedupe_headlines = dedupe;
        }
        if let PagePlan::Discover {
            fallback_last_page,
            max_pages,
        } = &mut self.pages
        {
            if let Some(n) = file.fallback_last_page {
                *fallback_last_page = n;
            }
            if let Some(n) = file.max_pages_per_day {
                *max_pages = n;
            }
        }
    }

    /// Reject settings that would make the run pointless or impossible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.min_token_len == 0 {
            return Err(ConfigError::ZeroTokenLength);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        match self.pages {
            PagePlan::Fixed(0) => return Err(ConfigError::ZeroPages),
            PagePlan::Discover {
                fallback_last_page,
                max_pages,
            } if fallback_last_page == 0 || max_pages == 0 => return Err(ConfigError::ZeroPages),
            _ => {}
        }
        validate_url_pattern(&self.url_pattern)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            max_concurrency: self.max_concurrency,
            timeout: self.fetch_timeout,
            user_agent: self.user_agent.clone(),
            retry: self.retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn range() -> DateRange {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        DateRange::new(day, day).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::new(range());
        assert!(config.validate().is_ok());
        assert!((1..=10).contains(&config.max_concurrency));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 0);
        assert!(config.stopwords.contains("기자"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::new(range());
        config.max_concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));

        let mut config = PipelineConfig::new(range());
        config.min_token_len = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTokenLength)));

        let mut config = PipelineConfig::new(range());
        config.fetch_timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));

        let mut config = PipelineConfig::new(range());
        config.pages = PagePlan::Fixed(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPages)));

        let mut config = PipelineConfig::new(range());
        config.url_pattern = "https://news.naver.com/list?page={page}".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPlaceholder { .. })
        ));
    }

    #[test]
    fn test_file_extends_default_stopwords() {
        let yaml = r#"
stopwords: [단독]
excluded_keywords: [코스피]
proper_nouns: [하이닉스]
max_pages_per_day: 7
dedupe_headlines: false
"#;
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(yaml.as_bytes()).unwrap();

        let file = FileConfig::load(tmp.path()).unwrap();
        let mut config = PipelineConfig::new(range());
        config.apply_file(file);

        assert!(config.stopwords.contains("단독"));
        assert!(config.stopwords.contains("기자"));
        assert!(config.excluded_keywords.contains("코스피"));
        assert_eq!(config.proper_nouns, vec!["하이닉스".to_string()]);
        assert!(!config.dedupe_headlines);
        assert_eq!(
            config.pages,
            PagePlan::Discover {
                fallback_last_page: 5,
                max_pages: 7
            }
        );
    }

    #[test]
    fn test_file_can_replace_default_stopwords() {
        let file: FileConfig =
            serde_yaml::from_str("stopwords: [단독]\nreplace_default_stopwords: true\n").unwrap();
        let mut config = PipelineConfig::new(range());
        config.apply_file(file);
        assert_eq!(config.stopwords.len(), 1);
        assert!(!config.stopwords.contains("기자"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"stopwrods: [x]\n").unwrap();
        assert!(matches!(
            FileConfig::load(tmp.path()),
            Err(ConfigError::ParseConfig { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        assert!(matches!(
            FileConfig::load(Path::new("/nonexistent/headline_cloud.yaml")),
            Err(ConfigError::ReadConfig { .. })
        ));
    }
}
