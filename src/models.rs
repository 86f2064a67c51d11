//! Data models shared by the fetch, extraction and aggregation stages.
//!
//! - [`DateRange`]: the inclusive calendar range that drives the run
//! - [`FetchTask`] / [`FetchResult`]: one listing page request and its outcome
//! - [`HeadlineRecord`]: a headline extracted from a listing page
//! - [`FrequencyTable`]: the term counts handed to the renderer
//! - [`RunReport`]: success and failure counts for the whole run

use crate::error::{ConfigError, FetchError};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// An inclusive range of calendar dates. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, counting both ends.
    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every date in the range, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

/// Logical identifier of a listing page: the publication date and page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub date: NaiveDate,
    pub page: u32,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/p{}", self.date.format("%Y%m%d"), self.page)
    }
}

/// A listing page to download. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    id: TaskId,
    url: String,
}

impl FetchTask {
    pub fn new(id: TaskId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Outcome of one [`FetchTask`]. Every task yields exactly one of these.
#[derive(Debug)]
pub enum FetchResult {
    Success {
        task: FetchTask,
        status: u16,
        body: String,
    },
    Failure {
        task: FetchTask,
        error: FetchError,
    },
}

#[cfg(test)]
impl FetchResult {
    pub fn task(&self) -> &FetchTask {
        match self {
            FetchResult::Success { task, .. } | FetchResult::Failure { task, .. } => task,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

/// A single headline found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineRecord {
    /// Visible text of the headline anchor with whitespace collapsed.
    pub text: String,
    /// The page this headline was extracted from.
    pub source: TaskId,
}

/// Term counts accumulated over every processed headline.
///
/// Keys are unique and kept in sorted order, so serialisation and iteration
/// are deterministic. A table is never mutated once built; pruning produces
/// a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    pub(crate) fn from_counts(counts: BTreeMap<String, u64>) -> Self {
        Self { counts }
    }

    #[cfg(test)]
    pub fn get(&self, term: &str) -> Option<u64> {
        self.counts.get(term).copied()
    }

    #[cfg(test)]
    pub fn contains(&self, term: &str) -> bool {
        self.counts.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The `n` highest counts, ties broken by term order.
    pub fn most_common(&self, n: usize) -> Vec<(&str, u64)> {
        self.iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .collect()
    }
}

/// A listing page that could not be fetched.
#[derive(Debug, Clone, Serialize)]
pub struct FailedPage {
    pub task: String,
    pub url: String,
    pub reason: String,
}

/// Success and failure counts for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub tasks_total: usize,
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    /// Pages fetched successfully whose markup held no headline elements.
    pub pages_without_headlines: usize,
    pub headlines_processed: usize,
    pub duplicate_headlines: usize,
    /// Headlines the analyzer could not segment.
    pub headlines_skipped: usize,
    pub terms_counted: u64,
    pub deadline_exceeded: bool,
    pub failures: Vec<FailedPage>,
    #[serde(skip)]
    pub sample_headlines: Vec<String>,
}

impl RunReport {
    pub(crate) const SAMPLE_SIZE: usize = 10;

    pub(crate) fn record_failure(&mut self, task: &FetchTask, error: &FetchError) {
        self.pages_failed += 1;
        self.failures.push(FailedPage {
            task: task.id().to_string(),
            url: task.url().to_string(),
            reason: error.to_string(),
        });
    }
}
