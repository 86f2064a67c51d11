//! Error types for the acquisition-and-aggregation pipeline.
//!
//! Only [`ConfigError`] is fatal. It is raised while the run is being set up,
//! before any request leaves the machine. [`FetchError`] and
//! [`TokenizeError`] are recorded against the page or headline that caused
//! them and the run carries on.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Invalid or missing configuration detected before the run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("minimum token length must be at least 1")]
    ZeroTokenLength,

    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,

    #[error("pages per day must be at least 1")]
    ZeroPages,

    #[error("url pattern {pattern:?} is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        pattern: String,
        placeholder: &'static str,
    },

    #[error("url pattern {pattern:?} does not produce a valid url: {source}")]
    InvalidUrl {
        pattern: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid css selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("font not found at {0} (a Hangul-capable font is required by the renderer)")]
    FontNotFound(PathBuf),

    #[error("a font path is required when a word-cloud request is written")]
    FontRequired,

    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failure of a single fetch task. Never aborts the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected http status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// Classify a reqwest error raised while sending a request.
    pub fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err)
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Status(code) => *code >= 500 || *code == 429,
            FetchError::Transport(e) => e.is_connect() || e.is_request(),
            FetchError::Body(_) => false,
        }
    }
}

/// The analyzer could not segment a headline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("input is empty")]
    EmptyInput,

    #[error("no analysable segments in {0:?}")]
    NoSegments(String),
}
