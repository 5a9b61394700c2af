//! Output types returned by the top-level cleanup entry points.

use crate::config::OutputFormat;
use serde::{Deserialize, Serialize};

/// The complete result of one cleanup run.
///
/// All three renditions are carried so callers can switch the displayed
/// format without re-running anything; [`CleanupOutput::final_text`] is
/// the projection most callers want.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupOutput {
    /// The layout-flattened text as recognized (or as supplied), verbatim.
    /// Empty when recognition found nothing or failed.
    pub raw_text: String,
    /// The AI-corrected text, light markup included.
    pub rewritten_text: String,
    /// The markup-stripped plain rendition of `rewritten_text`.
    pub plain_text: String,
    /// Why `raw_text` is empty, when the recognition boundary could say.
    pub diagnostic: Option<String>,
    /// Per-stage timings and retry count.
    pub stats: CleanupStats,
}

impl CleanupOutput {
    /// The final text in the requested format.
    pub fn final_text(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Plain => &self.plain_text,
            OutputFormat::Marked => &self.rewritten_text,
        }
    }
}

/// Wall-clock accounting for one cleanup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupStats {
    /// Time spent in acquisition + recognition (zero for pre-recognized
    /// text input).
    pub ocr_duration_ms: u64,
    /// Time spent in the rewrite stage, including caller-level retries.
    pub rewrite_duration_ms: u64,
    /// End-to-end duration.
    pub total_duration_ms: u64,
    /// How many times the rewrite transition was retried (0 = first
    /// attempt succeeded).
    pub rewrite_retries: u32,
}
