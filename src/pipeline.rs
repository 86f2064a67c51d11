//! Orchestration of a full run.
//!
//! ```text
//! DateRange -> listing tasks -> FetchClient (bounded, concurrent)
//!           -> HtmlExtractor -> Tokenizer -> Filter -> FrequencyAggregator
//! ```
//!
//! Results are consumed as they arrive, so raw markup for only a handful of
//! pages is alive at once. Each page is reduced to a [`PageTally`] and merged
//! into the shared aggregator in one synchronous step; dropping the run
//! future at any await point (for instance on a deadline) leaves every page
//! either fully counted or not counted at all.
//!
//! With [`PagePlan::Discover`] the run has two waves: page 1 of every day,
//! then the remaining pages advertised by each page 1 that had headlines.

use crate::analysis::filter::Filter;
use crate::analysis::frequency::{FrequencyAggregator, PageTally};
use crate::analysis::tokenizer::{HangulAnalyzer, MorphAnalyzer, Tokenizer};
use crate::config::{PagePlan, PipelineConfig};
use crate::error::ConfigError;
use crate::fetch::FetchClient;
use crate::models::{FetchResult, FetchTask, HeadlineRecord, RunReport};
use crate::scrapers::naver::{Extraction, HtmlExtractor, follow_up_tasks, listing_tasks};
use futures::StreamExt;
use std::collections::HashSet;
use std::pin::pin;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// A configured, validated run.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    client: FetchClient,
    extractor: HtmlExtractor,
    tokenizer: Tokenizer,
    filter: Filter,
}

impl Pipeline {
    /// Validate `config` and build every stage. No network activity happens
    /// here, so configuration errors surface before any work is done.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = FetchClient::new(config.fetch_settings())?;
        let extractor = HtmlExtractor::new(&config.headline_selector, &config.paging_selector)?;
        let tokenizer = Tokenizer::new(
            HangulAnalyzer::with_proper_nouns(&config.proper_nouns),
            config.min_token_len,
        );
        if config.stopwords.is_empty() {
            warn!("Stopword set is empty; filler nouns will be counted");
        }
        let filter = Filter::new(config.stopwords.clone(), config.excluded_keywords.clone());
        Ok(Self {
            config,
            client,
            extractor,
            tokenizer,
            filter,
        })
    }

    /// Swap in a different morphological analyzer.
    pub fn with_analyzer(mut self, analyzer: impl MorphAnalyzer + 'static) -> Self {
        self.tokenizer = Tokenizer::new(analyzer, self.config.min_token_len);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// First-wave tasks. Their count depends only on the date range and
    /// page plan.
    pub fn initial_tasks(&self) -> Vec<FetchTask> {
        let pages = match self.config.pages {
            PagePlan::Fixed(n) => 1..=n,
            PagePlan::Discover { .. } => 1..=1,
        };
        listing_tasks(&self.config.url_pattern, &self.config.date_range, pages)
    }

    /// Run to completion, or until `deadline` elapses.
    ///
    /// Counts land in `aggregator`, which the caller keeps, so whatever was
    /// merged before a deadline is still available afterwards.
    #[instrument(level = "info", skip_all, fields(range = %self.config.date_range))]
    pub async fn run(&self, aggregator: &FrequencyAggregator, deadline: Option<Duration>) -> RunReport {
        let t0 = Instant::now();
        let mut report = RunReport::default();

        let completed = {
            let work = self.drive(aggregator, &mut report);
            match deadline {
                Some(limit) => timeout(limit, work).await.is_ok(),
                None => {
                    work.await;
                    true
                }
            }
        };

        if !completed {
            report.deadline_exceeded = true;
            warn!(
                ?deadline,
                pages_succeeded = report.pages_succeeded,
                "Deadline exceeded; in-flight fetches abandoned"
            );
        }

        info!(
            tasks = report.tasks_total,
            succeeded = report.pages_succeeded,
            failed = report.pages_failed,
            without_headlines = report.pages_without_headlines,
            headlines = report.headlines_processed,
            duplicates = report.duplicate_headlines,
            skipped = report.headlines_skipped,
            terms = report.terms_counted,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Run finished"
        );
        report
    }

    async fn drive(&self, aggregator: &FrequencyAggregator, report: &mut RunReport) {
        let mut seen = HashSet::new();

        let initial = self.initial_tasks();
        info!(
            days = self.config.date_range.day_count(),
            tasks = initial.len(),
            "Fetching listing pages"
        );
        let follow_ups = self.process_wave(initial, aggregator, report, &mut seen).await;

        if !follow_ups.is_empty() {
            info!(tasks = follow_ups.len(), "Fetching discovered pages");
            self.process_wave(follow_ups, aggregator, report, &mut seen)
                .await;
        }
    }

    /// Fetch and process one batch, returning the follow-up tasks it revealed.
    async fn process_wave(
        &self,
        tasks: Vec<FetchTask>,
        aggregator: &FrequencyAggregator,
        report: &mut RunReport,
        seen: &mut HashSet<String>,
    ) -> Vec<FetchTask> {
        report.tasks_total += tasks.len();
        let mut follow_ups = Vec::new();

        let mut results = pin!(self.client.fetch_stream(tasks));
        while let Some(result) = results.next().await {
            match result {
                FetchResult::Failure { task, error } => {
                    warn!(task = %task.id(), url = %task.url(), error = %error, "Listing page failed");
                    report.record_failure(&task, &error);
                }
                FetchResult::Success { task, status, body } => {
                    report.pages_succeeded += 1;
                    let extraction = self.extractor.extract(&body, task.id());
                    if extraction.headlines.is_empty() {
                        report.pages_without_headlines += 1;
                        warn!(task = %task.id(), status, "No headlines found; page layout may have changed");
                        continue;
                    }

                    if let Some(last) = self.discovered_last_page(&task, &extraction) {
                        debug!(task = %task.id(), last, "Discovered page count");
                        follow_ups.extend(follow_up_tasks(
                            &self.config.url_pattern,
                            task.id().date,
                            2,
                            last,
                        ));
                    }

                    let tally = self.tally(extraction.headlines, report, seen);
                    report.terms_counted += tally.total();
                    aggregator.merge(tally);
                }
            }
        }
        follow_ups
    }

    fn discovered_last_page(&self, task: &FetchTask, extraction: &Extraction) -> Option<u32> {
        match self.config.pages {
            PagePlan::Discover {
                fallback_last_page,
                max_pages,
            } if task.id().page == 1 => Some(
                extraction
                    .last_page
                    .unwrap_or(fallback_last_page)
                    .min(max_pages),
            ),
            _ => None,
        }
    }

    /// Tokenize and filter a page's headlines into a local tally.
    fn tally(
        &self,
        headlines: Vec<HeadlineRecord>,
        report: &mut RunReport,
        seen: &mut HashSet<String>,
    ) -> PageTally {
        let mut tally = PageTally::new();
        for record in headlines {
            if self.config.dedupe_headlines && !seen.insert(record.text.clone()) {
                report.duplicate_headlines += 1;
                continue;
            }

            let tokens = match self.tokenizer.tokenize(&record.text) {
                Ok(tokens) => tokens,
                Err(e) => {
                    report.headlines_skipped += 1;
                    debug!(task = %record.source, headline = %record.text, error = %e, "Skipping headline");
                    continue;
                }
            };

            report.headlines_processed += 1;
            if report.sample_headlines.len() < RunReport::SAMPLE_SIZE {
                report.sample_headlines.push(record.text);
            }
            for token in self.filter.apply(tokens.iter()) {
                tally.add(token.term);
            }
        }
        tally
    }
}
