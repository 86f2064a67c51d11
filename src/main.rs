//! # Headline Cloud
//!
//! Collects economy-section headlines from Naver News over a date range,
//! reduces them to noun frequencies and hands the result to a word-cloud
//! renderer.
//!
//! ## Usage
//!
//! ```sh
//! headline_cloud -s 2025-02-01 -e 2025-02-08 -o ./output
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags and optional YAML are validated before any
//!    request is made
//! 2. **Fetching**: listing pages are downloaded with bounded concurrency
//! 3. **Analysis**: headlines are extracted, tokenized into nouns, filtered
//!    and counted
//! 4. **Output**: the frequency table is pruned of its most common terms and
//!    written as JSON, plus an optional request file for the renderer

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use analysis::frequency::FrequencyAggregator;
use cli::Cli;
use outputs::cloud::{CloudLayout, CloudRequest, require_font, write_cloud_request};
use outputs::json::{FrequencyDocument, write_frequency_document};
use pipeline::Pipeline;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_cloud starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration (fatal errors only, nothing fetched yet) ----
    let config = args
        .pipeline_config()
        .inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    let font_path = match &args.cloud_spec {
        Some(_) => Some(
            require_font(args.font_path.as_deref())
                .inspect_err(|e| error!(error = %e, "Word-cloud request cannot be written"))?,
        ),
        None => {
            if args.font_path.is_none() {
                warn!("No font path given; the renderer needs a Hangul-capable font");
            }
            args.font_path.clone()
        }
    };

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let pipeline = Pipeline::new(config)?;
    info!(
        range = %pipeline.config().date_range,
        concurrency = pipeline.config().max_concurrency,
        timeout = ?pipeline.config().fetch_timeout,
        stopwords = pipeline.config().stopwords.len(),
        excluded = pipeline.config().excluded_keywords.len(),
        "Pipeline configured"
    );

    // ---- Fetch, extract, tokenize, count ----
    let aggregator = FrequencyAggregator::new();
    let report = pipeline.run(&aggregator, args.deadline()).await;
    let table = aggregator.finish();

    for (i, headline) in report.sample_headlines.iter().enumerate() {
        info!(rank = i + 1, headline = %truncate_for_log(headline, 80), "Sample headline");
    }
    if report.pages_succeeded == 0 {
        warn!(failed = report.pages_failed, "No listing page could be fetched");
    }

    // ---- Prune the most common terms ----
    let top_n = pipeline.config().top_n_prune;
    let (table, pruned) = table.prune_most_common(top_n, &pipeline.config().protected_keywords);
    info!(top_n, pruned = ?pruned, "Removed most common terms (protected keywords kept)");
    debug!(top = ?table.most_common(20), "Top terms");
    if table.is_empty() {
        warn!("Frequency table is empty; the word cloud will have nothing to draw");
    }

    // ---- Outputs ----
    let document = FrequencyDocument::new(pipeline.config().date_range, &table, &pruned, &report);
    write_frequency_document(&document, &args.output_dir)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to write frequency JSON"))?;

    if let (Some(path), Some(font_path)) = (&args.cloud_spec, font_path) {
        let request = CloudRequest::new(&table, font_path, CloudLayout::default());
        write_cloud_request(&request, path)
            .await
            .inspect_err(|e| error!(path = %path.display(), error = %e, "Failed to write word-cloud request"))?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        terms = table.len(),
        occurrences = table.total(),
        pages_succeeded = report.pages_succeeded,
        pages_failed = report.pages_failed,
        pages_without_headlines = report.pages_without_headlines,
        deadline_exceeded = report.deadline_exceeded,
        "Execution complete"
    );

    Ok(())
}
