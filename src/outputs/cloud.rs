//! Word-cloud request for the external renderer.
//!
//! The renderer consumes term weights, a font path and layout settings. The
//! font must cover Hangul, so its presence is checked before the run starts.

use crate::error::ConfigError;
use crate::models::FrequencyTable;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Layout settings passed through to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudLayout {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub background_color: String,
    pub colormap: String,
    pub prefer_horizontal: f32,
    pub relative_scaling: f32,
}

impl Default for CloudLayout {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            max_words: 150,
            background_color: "white".to_string(),
            colormap: "Dark2".to_string(),
            prefer_horizontal: 1.0,
            relative_scaling: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Weight {
    pub term: String,
    pub weight: u64,
}

/// Everything the renderer needs, heaviest terms first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudRequest {
    pub font_path: PathBuf,
    pub layout: CloudLayout,
    pub weights: Vec<Weight>,
}

impl CloudRequest {
    /// Keep the `layout.max_words` heaviest terms of `table`.
    pub fn new(table: &FrequencyTable, font_path: PathBuf, layout: CloudLayout) -> Self {
        let weights = table
            .most_common(layout.max_words)
            .into_iter()
            .map(|(term, weight)| Weight {
                term: term.to_string(),
                weight,
            })
            .collect();
        Self {
            font_path,
            layout,
            weights,
        }
    }
}

/// Resolve the renderer font, failing when it is missing.
pub fn require_font(font_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = font_path.ok_or(ConfigError::FontRequired)?;
    if !path.is_file() {
        return Err(ConfigError::FontNotFound(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_cloud_request(request: &CloudRequest, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(request)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, json).await?;
    info!(words = request.weights.len(), "Wrote word-cloud request");
    Ok(())
}
