//! The per-document orchestrator: an explicit state machine over one
//! cleanup session.
//!
//! A document progresses `Empty → Recognized → Ready`. The state is a
//! tagged enum rather than a set of optional fields, so "asked for the
//! final text before it exists" is an exhaustively-matched error, not a
//! latent `None` unwrap. The rewritten and plain renditions are committed
//! together in one transition — there is no observable moment where one
//! exists without the other, because markup normalisation is infallible
//! and runs inside the same step.
//!
//! Re-entrancy: acquiring new text regresses a `Ready` document to
//! `Recognized`, discarding both derived renditions — new raw text
//! invalidates any prior rewrite. A *failed* rewrite, by contrast, leaves
//! the document exactly as it was, so retrying from the same raw text is
//! always safe.

use crate::config::OutputFormat;
use crate::error::Ink2TextError;
use crate::pipeline::normalize::normalize;
use crate::pipeline::ocr::OcrAdapter;
use crate::pipeline::rewrite::RewriteEngine;
use std::fmt;
use tracing::{debug, warn};

/// The externally observable progress of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No text acquired yet.
    Empty,
    /// Raw recognized text is present (possibly empty — an unreadable
    /// image is a valid, if degenerate, result).
    Recognized,
    /// Both the rewritten and the plain rendition are present.
    Ready,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentState::Empty => "empty",
            DocumentState::Recognized => "recognized",
            DocumentState::Ready => "ready",
        })
    }
}

enum State {
    Empty,
    Recognized {
        raw: String,
    },
    Ready {
        raw: String,
        rewritten: String,
        plain: String,
    },
}

/// One handwritten document moving through the cleanup pipeline.
///
/// Owns the three text artifacts for the lifetime of one session; nothing
/// is persisted unless the caller exports it. Exactly one caller drives a
/// document at a time (`&mut self` transitions), so no locking exists or
/// is needed.
pub struct Document {
    state: State,
    /// Side channel from the last acquisition: why the raw text is empty,
    /// when the recognition boundary could say.
    diagnostic: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            state: State::Empty,
            diagnostic: None,
        }
    }

    /// The current state tag.
    pub fn state(&self) -> DocumentState {
        match self.state {
            State::Empty => DocumentState::Empty,
            State::Recognized { .. } => DocumentState::Recognized,
            State::Ready { .. } => DocumentState::Ready,
        }
    }

    /// Run handwriting recognition on `image` and store the result.
    ///
    /// Always advances to `Recognized`, even when nothing was recognized;
    /// any previously derived renditions are discarded.
    pub async fn recognize(&mut self, adapter: &OcrAdapter, image: &[u8]) {
        let recognition = adapter.recognize(image).await;
        if recognition.text.is_empty() {
            warn!("Recognition produced no text; document is degraded");
        } else {
            debug!("Recognition stored {} chars", recognition.text.len());
        }
        self.diagnostic = recognition.diagnostic;
        self.state = State::Recognized {
            raw: recognition.text,
        };
    }

    /// Store text that was recognized elsewhere (the alternate acquisition
    /// strategy). Same transition semantics as [`Document::recognize`].
    pub fn supply_text(&mut self, text: impl Into<String>) {
        self.diagnostic = None;
        self.state = State::Recognized { raw: text.into() };
    }

    /// Rewrite the raw text and derive the plain rendition, committing
    /// both atomically.
    ///
    /// Valid from `Recognized` (the normal transition) and from `Ready`
    /// (re-running regenerates both renditions from the same raw text).
    /// On failure the document is left untouched in its prior state.
    pub async fn rewrite(&mut self, engine: &RewriteEngine) -> Result<(), Ink2TextError> {
        let raw = match &self.state {
            State::Empty => {
                return Err(Ink2TextError::InvalidState {
                    expected: DocumentState::Recognized,
                    actual: DocumentState::Empty,
                })
            }
            State::Recognized { raw } | State::Ready { raw, .. } => raw.clone(),
        };

        let rewritten = engine.rewrite(&raw).await?;
        let plain = normalize(&rewritten);
        self.state = State::Ready {
            raw,
            rewritten,
            plain,
        };
        Ok(())
    }

    /// Project the final text in the requested format.
    ///
    /// A pure view over the stored renditions — valid only once `Ready`.
    pub fn select(&self, format: OutputFormat) -> Result<&str, Ink2TextError> {
        match &self.state {
            State::Ready { rewritten, plain, .. } => Ok(match format {
                OutputFormat::Plain => plain,
                OutputFormat::Marked => rewritten,
            }),
            _ => Err(Ink2TextError::InvalidState {
                expected: DocumentState::Ready,
                actual: self.state(),
            }),
        }
    }

    /// The raw recognized text. Valid from `Recognized` onward.
    pub fn raw_text(&self) -> Result<&str, Ink2TextError> {
        match &self.state {
            State::Empty => Err(Ink2TextError::InvalidState {
                expected: DocumentState::Recognized,
                actual: DocumentState::Empty,
            }),
            State::Recognized { raw } | State::Ready { raw, .. } => Ok(raw),
        }
    }

    /// The diagnostic from the last acquisition, if the recognition
    /// boundary reported one.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_is_empty() {
        let doc = Document::new();
        assert_eq!(doc.state(), DocumentState::Empty);
        assert!(doc.raw_text().is_err());
        assert!(doc.diagnostic().is_none());
    }

    #[test]
    fn supply_text_advances_to_recognized() {
        let mut doc = Document::new();
        doc.supply_text("teks mentah");
        assert_eq!(doc.state(), DocumentState::Recognized);
        assert_eq!(doc.raw_text().unwrap(), "teks mentah");
    }

    #[test]
    fn empty_text_still_advances() {
        let mut doc = Document::new();
        doc.supply_text("");
        assert_eq!(doc.state(), DocumentState::Recognized);
        assert_eq!(doc.raw_text().unwrap(), "");
    }

    #[test]
    fn select_before_ready_is_invalid_state() {
        let mut doc = Document::new();
        doc.supply_text("teks");
        let err = doc.select(OutputFormat::Plain).unwrap_err();
        match err {
            Ink2TextError::InvalidState { expected, actual } => {
                assert_eq!(expected, DocumentState::Ready);
                assert_eq!(actual, DocumentState::Recognized);
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn display_names_are_lowercase() {
        assert_eq!(DocumentState::Empty.to_string(), "empty");
        assert_eq!(DocumentState::Recognized.to_string(), "recognized");
        assert_eq!(DocumentState::Ready.to_string(), "ready");
    }
}
