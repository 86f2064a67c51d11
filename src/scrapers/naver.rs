//! Naver News economy-section listing scraper.
//!
//! This module targets the "latest news" listing of the economy section
//! (`sid1=101`). Each listing page shows a block of headline links plus a
//! pagination bar.
//!
//! # URL Pattern
//!
//! ```text
//! https://news.naver.com/main/list.naver?mode=LSD&mid=sec&sid1=101&date={date}&page={page}
//! ```
//!
//! `{date}` is `YYYYMMDD` and `{page}` is 1-based.
//!
//! # Layout drift
//!
//! The selectors are tied to the site's current markup. When they stop
//! matching, a page yields no headlines; the caller counts that as a
//! diagnostic instead of failing the run.

use crate::error::ConfigError;
use crate::models::{DateRange, FetchTask, HeadlineRecord, TaskId};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_URL_PATTERN: &str =
    "https://news.naver.com/main/list.naver?mode=LSD&mid=sec&sid1=101&date={date}&page={page}";

/// Headline anchors, excluding the thumbnail anchors of photo entries.
pub const DEFAULT_HEADLINE_SELECTOR: &str = ".list_body.newsflash_body li dt:not(.photo) a";

/// Numbered links of the pagination bar.
pub const DEFAULT_PAGING_SELECTOR: &str = ".paging a";

/// Fill the `{date}` and `{page}` placeholders of a listing URL pattern.
pub fn listing_url(pattern: &str, date: NaiveDate, page: u32) -> String {
    pattern
        .replace("{date}", &date.format("%Y%m%d").to_string())
        .replace("{page}", &page.to_string())
}

/// Check that a pattern has both placeholders and yields a valid URL.
pub fn validate_url_pattern(pattern: &str) -> Result<(), ConfigError> {
    for placeholder in ["{date}", "{page}"] {
        if !pattern.contains(placeholder) {
            return Err(ConfigError::MissingPlaceholder {
                pattern: pattern.to_string(),
                placeholder,
            });
        }
    }
    let sample = listing_url(pattern, NaiveDate::default(), 1);
    Url::parse(&sample).map_err(|source| ConfigError::InvalidUrl {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(())
}

/// Listing-page tasks for pages `pages` of every date in `range`.
///
/// The task count is always `range.day_count() * pages.len()`.
pub fn listing_tasks(
    pattern: &str,
    range: &DateRange,
    pages: std::ops::RangeInclusive<u32>,
) -> Vec<FetchTask> {
    range
        .days()
        .flat_map(|date| pages.clone().map(move |page| (date, page)))
        .map(|(date, page)| FetchTask::new(TaskId { date, page }, listing_url(pattern, date, page)))
        .collect()
}

/// Tasks for pages `from..=to` of a single date.
pub fn follow_up_tasks(pattern: &str, date: NaiveDate, from: u32, to: u32) -> Vec<FetchTask> {
    (from..=to)
        .map(|page| FetchTask::new(TaskId { date, page }, listing_url(pattern, date, page)))
        .collect()
}

/// What one listing page yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub headlines: Vec<HeadlineRecord>,
    /// Highest page number shown in the pagination bar, if any.
    pub last_page: Option<u32>,
}

/// Pulls headline text and pagination out of listing-page markup.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    headline: Selector,
    paging: Selector,
}

impl HtmlExtractor {
    pub fn new(headline_selector: &str, paging_selector: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            headline: parse_selector(headline_selector)?,
            paging: parse_selector(paging_selector)?,
        })
    }

    /// Extract every headline on the page, in document order.
    ///
    /// Returns an empty list when the expected structure is absent.
    #[instrument(level = "debug", skip_all, fields(task = %source))]
    pub fn extract(&self, html: &str, source: TaskId) -> Extraction {
        let document = Html::parse_document(html);

        let headlines: Vec<HeadlineRecord> = document
            .select(&self.headline)
            .filter_map(visible_text)
            .map(|text| HeadlineRecord { text, source })
            .collect();

        let last_page = document
            .select(&self.paging)
            .filter_map(|element| visible_text(element)?.parse::<u32>().ok())
            .max();

        debug!(count = headlines.len(), ?last_page, "Extracted listing page");
        Extraction {
            headlines,
            last_page,
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text content of an element with runs of whitespace collapsed to one space.
fn visible_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}
