//! JSON output of the frequency table.
//!
//! One file per run, named after the date range:
//! ```text
//! output_dir/
//! └── 2025-02-01_2025-02-08.json
//! ```

use crate::models::{DateRange, FrequencyTable, RunReport};
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialized form of a finished run.
#[derive(Debug, Serialize)]
pub struct FrequencyDocument<'a> {
    pub range: DateRange,
    pub generated_at: String,
    pub terms: &'a FrequencyTable,
    /// Terms removed by top-N pruning, in rank order.
    pub pruned_terms: &'a [String],
    pub report: &'a RunReport,
}

impl<'a> FrequencyDocument<'a> {
    pub fn new(
        range: DateRange,
        terms: &'a FrequencyTable,
        pruned_terms: &'a [String],
        report: &'a RunReport,
    ) -> Self {
        Self {
            range,
            generated_at: Local::now().to_rfc3339(),
            terms,
            pruned_terms,
            report,
        }
    }

    /// `{start}_{end}.json`
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.range.start(), self.range.end())
    }
}

/// Write `document` into `output_dir`, returning the file path.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_frequency_document(
    document: &FrequencyDocument<'_>,
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(document)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(%output_dir, error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = PathBuf::from(output_dir).join(document.file_name());
    fs::write(&path, json).await?;
    info!(
        path = %path.display(),
        terms = document.terms.len(),
        "Wrote frequency table"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::frequency::FrequencyAggregator;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_writes_named_file_with_terms_and_report() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 8).unwrap(),
        )
        .unwrap();
        let agg = FrequencyAggregator::new();
        agg.add_batch(["관세", "관세", "환율"]);
        let table = agg.finish();
        let pruned = vec!["증시".to_string()];
        let report = RunReport {
            tasks_total: 8,
            pages_succeeded: 7,
            pages_failed: 1,
            ..Default::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("json");
        let document = FrequencyDocument::new(range, &table, &pruned, &report);
        let path = write_frequency_document(&document, out.to_str().unwrap())
            .await
            .unwrap();

        assert!(path.ends_with("2025-02-01_2025-02-08.json"));
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["terms"]["관세"], 2);
        assert_eq!(value["terms"]["환율"], 1);
        assert_eq!(value["pruned_terms"][0], "증시");
        assert_eq!(value["report"]["pages_failed"], 1);
        assert_eq!(value["range"]["start"], "2025-02-01");
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_an_error() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let range = DateRange::new(day, day).unwrap();
        let table = FrequencyAggregator::new().finish();
        let report = RunReport::default();
        let document = FrequencyDocument::new(range, &table, &[], &report);

        // A regular file where the directory should be.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let result = write_frequency_document(&document, blocker.path().to_str().unwrap()).await;
        assert!(result.is_err());
    }
}
