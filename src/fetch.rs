//! Concurrent listing-page fetching with optional exponential backoff.
//!
//! [`FetchClient`] turns a list of [`FetchTask`]s into exactly one
//! [`FetchResult`] per task. At most `max_concurrency` requests are in flight
//! at any time. Failures (timeouts, non-2xx statuses, transport errors) are
//! returned as [`FetchResult::Failure`] values and never abort the batch.
//!
//! # Retry Strategy
//!
//! Retries are off by default (`max_retries = 0`). When enabled, only
//! retryable failures are attempted again, with a delay of
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::error::{ConfigError, FetchError};
use crate::models::{FetchResult, FetchTask};
use futures::stream::{self, Stream, StreamExt};
use rand::{Rng, rng};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// How failed requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one. Zero means a single attempt.
    pub max_retries: usize,
    /// Initial delay between attempts (doubles with each attempt).
    pub base_delay: Duration,
    /// Upper bound on the delay before jitter.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(16) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

/// HTTP settings for a [`FetchClient`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub max_concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

/// Bounded-concurrency HTTP GET client for listing pages.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    settings: FetchSettings,
}

impl FetchClient {
    pub fn new(settings: FetchSettings) -> Result<Self, ConfigError> {
        if settings.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { http, settings })
    }

    /// Fetch every task, yielding results as they complete.
    ///
    /// Completion order may differ from submission order. The stream ends
    /// after exactly one result per task.
    pub fn fetch_stream(&self, tasks: Vec<FetchTask>) -> impl Stream<Item = FetchResult> + '_ {
        stream::iter(tasks)
            .map(move |task| self.fetch_one(task))
            .buffer_unordered(self.settings.max_concurrency)
    }

    /// Fetch a single task, retrying per the configured policy.
    #[instrument(level = "debug", skip_all, fields(task = %task.id(), url = %task.url()))]
    pub async fn fetch_one(&self, task: FetchTask) -> FetchResult {
        let retry = self.settings.retry;
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.attempt(&task).await {
                Ok((status, body)) => {
                    debug!(
                        status,
                        bytes = body.len(),
                        elapsed_ms = attempt_t0.elapsed().as_millis() as u64,
                        "Fetched listing page"
                    );
                    return FetchResult::Success { task, status, body };
                }
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    if attempt > retry.max_retries || !e.is_retryable() {
                        error!(
                            attempt,
                            max = retry.max_retries,
                            elapsed_ms_total,
                            error = %e,
                            "Fetch failed"
                        );
                        return FetchResult::Failure { task, error: e };
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = retry.backoff(attempt) + Duration::from_millis(jitter_ms);
                    warn!(
                        attempt,
                        max = retry.max_retries,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "Fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(&self, task: &FetchTask) -> Result<(u16, String), FetchError> {
        let timeout = self.settings.timeout;
        let response = self
            .http
            .get(task.url())
            .send()
            .await
            .map_err(|e| FetchError::from_send(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Body(e)
            }
        })?;
        Ok((status.as_u16(), body))
    }
}
