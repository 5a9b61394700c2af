//! # ink2text
//!
//! Turn images of handwritten notes into clean, corrected text.
//!
//! ## Why this crate?
//!
//! Raw OCR of handwriting is rough: misread letters, broken line flow, no
//! punctuation discipline. Instead of shipping that to the user, this
//! crate hands the recognized text to a generative model with a fixed
//! correction prompt — fix sentence structure and spelling, reflow the
//! layout, number each answer — and then deterministically strips the
//! light markup the model likes to add, so callers can offer both a
//! marked and a plain rendition of the same document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image / pre-OCR'd text
//!  │
//!  ├─ 1. Acquire    read the file, validate image magic bytes
//!  ├─ 2. Recognize  Google Vision DOCUMENT_TEXT_DETECTION
//!  │                (failures → empty text + diagnostic, never an error)
//!  ├─ 3. Rewrite    Gemini generateContent with the fixed correction prompt
//!  └─ 4. Normalize  strip **emphasis** / leading bullets → plain rendition
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ink2text::{clean, CleanupConfig, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from GOOGLE_APPLICATION_CREDENTIALS_JSON / GEMINI_API_KEY
//!     let config = CleanupConfig::default();
//!     let output = clean("notes.jpg", &config).await?;
//!     println!("{}", output.final_text(OutputFormat::Plain));
//!     Ok(())
//! }
//! ```
//!
//! Driving the stages individually (for UIs that show intermediate text):
//!
//! ```rust,no_run
//! use ink2text::{Document, OcrAdapter, OutputFormat, RewriteEngine};
//! # use std::sync::Arc;
//! # async fn demo(
//! #     recognizer: Arc<dyn ink2text::HandwritingRecognizer>,
//! #     rewriter: Arc<dyn ink2text::TextRewriter>,
//! #     image: &[u8],
//! # ) -> Result<(), ink2text::Ink2TextError> {
//! let adapter = OcrAdapter::new(recognizer);
//! let engine = RewriteEngine::new(rewriter);
//!
//! let mut doc = Document::new();
//! doc.recognize(&adapter, image).await;      // always advances
//! doc.rewrite(&engine).await?;               // may fail; state preserved
//! let plain = doc.select(OutputFormat::Plain)?;
//! # let _ = plain;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ink2text` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ink2text = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod auth;
pub mod clean;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use auth::{ServiceAccountKey, TokenSource};
pub use clean::{clean, clean_sync};
pub use config::{CleanupConfig, CleanupConfigBuilder, InputKind, OutputFormat};
pub use document::{Document, DocumentState};
pub use error::Ink2TextError;
pub use output::{CleanupOutput, CleanupStats};
pub use pipeline::normalize::normalize;
pub use pipeline::ocr::{
    GoogleVisionRecognizer, HandwritingRecognizer, OcrAdapter, Recognition, RecognizerResponse,
};
pub use pipeline::rewrite::{GeminiRewriter, RewriteEngine, TextRewriter};
