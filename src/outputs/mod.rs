//! Output generation for the frequency table.
//!
//! # Submodules
//!
//! - [`json`]: Writes the frequency table and run report as JSON
//! - [`cloud`]: Writes the word-cloud request consumed by the external renderer
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── 2025-02-01_2025-02-08.json   # table + pruned terms + run report
//!
//! cloud_spec_path                  # weights + font + layout for the renderer
//! ```
//!
//! Drawing the cloud is left to the renderer. It needs a font able to render
//! Hangul glyphs; without one it fails or draws empty boxes.

pub mod cloud;
pub mod json;
