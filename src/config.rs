//! Configuration types for the cleanup pipeline.
//!
//! All behaviour is controlled through [`CleanupConfig`], built via its
//! [`CleanupConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across calls, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! The two `Option<Arc<dyn …>>` fields are the dependency-injection seam:
//! callers (and tests) hand the pipeline already-authenticated service
//! handles instead of letting it read ambient credentials. When both are
//! left `None`, [`crate::clean::clean`] falls back to building Google
//! clients from the environment.

use crate::error::Ink2TextError;
use crate::pipeline::ocr::HandwritingRecognizer;
use crate::pipeline::rewrite::TextRewriter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default generative model, matching the product's production setting.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";

/// Configuration for one cleanup run.
///
/// Built via [`CleanupConfig::builder()`] or [`CleanupConfig::default()`].
///
/// # Example
/// ```rust
/// use ink2text::CleanupConfig;
///
/// let config = CleanupConfig::builder()
///     .model("gemini-2.5-flash-preview-05-20")
///     .temperature(0.2)
///     .max_retries(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CleanupConfig {
    /// Generative model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature for the rewrite completion. Default: None
    /// (the service default).
    ///
    /// Low values keep the model faithful to the recognized text — the goal
    /// is correction, not creativity. Left unset unless the caller has a
    /// reason to override.
    pub temperature: Option<f32>,

    /// Maximum tokens the model may generate for the rewrite. Default: None
    /// (the service default).
    ///
    /// Handwritten notes are short; the service default is ample. Setting
    /// this too low silently truncates the corrected text mid-sentence.
    pub max_output_tokens: Option<u32>,

    /// Maximum caller-level retries of the rewrite transition. Default: 2.
    ///
    /// The rewrite engine itself performs exactly one attempt per call;
    /// retrying from the same raw text is safe because the transition is
    /// idempotent given identical input. Permanent errors (bad API key,
    /// 400) still fail on every attempt and surface after the last one.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Per-service-call timeout in seconds. Default: 60.
    ///
    /// Applied to the HTTP client underlying both the recognition and the
    /// rewrite calls; the pipeline core enforces no timeouts of its own.
    pub api_timeout_secs: u64,

    /// How to interpret the input file. Default: [`InputKind::Image`].
    pub input_kind: InputKind,

    /// Pre-constructed handwriting recognizer. When set, the environment
    /// fallback for Vision credentials is skipped entirely.
    pub recognizer: Option<Arc<dyn HandwritingRecognizer>>,

    /// Pre-constructed text rewriter. When set, the environment fallback
    /// for the Gemini API key is skipped entirely.
    pub rewriter: Option<Arc<dyn TextRewriter>>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
            max_retries: 2,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            input_kind: InputKind::default(),
            recognizer: None,
            rewriter: None,
        }
    }
}

impl fmt::Debug for CleanupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("input_kind", &self.input_kind)
            .field(
                "recognizer",
                &self.recognizer.as_ref().map(|_| "<dyn HandwritingRecognizer>"),
            )
            .field("rewriter", &self.rewriter.as_ref().map(|_| "<dyn TextRewriter>"))
            .finish()
    }
}

impl CleanupConfig {
    /// Create a new builder for `CleanupConfig`.
    pub fn builder() -> CleanupConfigBuilder {
        CleanupConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CleanupConfig`].
#[derive(Debug)]
pub struct CleanupConfigBuilder {
    config: CleanupConfig,
}

impl CleanupConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = Some(n.max(1));
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn input_kind(mut self, kind: InputKind) -> Self {
        self.config.input_kind = kind;
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn HandwritingRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn rewriter(mut self, rewriter: Arc<dyn TextRewriter>) -> Self {
        self.config.rewriter = Some(rewriter);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CleanupConfig, Ink2TextError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(Ink2TextError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if let Some(t) = c.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Ink2TextError::InvalidConfig(format!(
                    "Temperature must be 0.0–2.0, got {t}"
                )));
            }
        }
        if c.api_timeout_secs == 0 {
            return Err(Ink2TextError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which of the two stored renditions a caller wants as "the" final text.
///
/// A pure view selector over the document's artifacts — choosing a format
/// never recomputes or mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// The markup-stripped plain rendition. (default)
    #[default]
    Plain,
    /// The rewritten text verbatim, light markup included.
    Marked,
}

/// How the input file should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputKind {
    /// A PNG/JPEG/WEBP photo or scan to run through handwriting
    /// recognition. (default)
    #[default]
    Image,
    /// A text file whose bytes are already the output of an earlier OCR
    /// run; decoded as UTF-8 (lossily) and fed straight to the rewrite
    /// stage.
    PreRecognizedText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CleanupConfig::builder().build().expect("default must build");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_retries, 2);
        assert!(config.temperature.is_none());
        assert_eq!(config.input_kind, InputKind::Image);
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = CleanupConfig::builder()
            .temperature(5.0)
            .build()
            .expect("clamped config must build");
        assert_eq!(config.temperature, Some(2.0));
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = CleanupConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, Ink2TextError::InvalidConfig(_)));
    }

    #[test]
    fn debug_omits_injected_handles() {
        let config = CleanupConfig::default();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("recognizer: None"));
        assert!(dbg.contains("rewriter: None"));
    }
}
