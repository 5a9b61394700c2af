//! Pipeline stages for handwriting cleanup.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different recognition backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! acquire ──▶ ocr ──▶ rewrite ──▶ normalize
//! (file)   (Vision) (Gemini)    (markup strip)
//! ```
//!
//! 1. [`acquire`]   — read the input file as image bytes or pre-recognized
//!    text
//! 2. [`ocr`]       — recognize handwriting via the remote Vision service;
//!    failures become an empty result plus a diagnostic, never an error
//! 3. [`rewrite`]   — one generative call against the fixed correction
//!    prompt; the only stage whose failure aborts the run
//! 4. [`normalize`] — deterministic markup stripping to derive the plain
//!    rendition
//!
//! The first two stages hold the only network I/O; `normalize` is a pure
//! function and `acquire` touches only the local filesystem.

pub mod acquire;
pub mod normalize;
pub mod ocr;
pub mod rewrite;
