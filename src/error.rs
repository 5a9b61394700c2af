//! Error types for the ink2text library.
//!
//! One deliberate asymmetry shapes this module: recognition failures are
//! NOT represented here. The OCR boundary reports problems through
//! [`crate::pipeline::ocr::Recognition::diagnostic`] and commits an empty
//! raw text instead of erroring, so a blank photo and a Vision outage look
//! the same to the orchestrator. Everything that *can* abort a call —
//! unreadable input, bad credentials, a failed rewrite, a state misuse —
//! is an [`Ink2TextError`].

use crate::document::DocumentState;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ink2text library.
#[derive(Debug, Error)]
pub enum Ink2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a supported image format.
    #[error("File is not a supported image (PNG/JPEG/WEBP): '{path}'\nFirst bytes: {magic:?}\nIf this is a previously-OCR'd text file, pass it with --text.")]
    UnsupportedImage { path: PathBuf, magic: [u8; 4] },

    // ── Credential errors ─────────────────────────────────────────────────
    /// The service-account key blob could not be parsed.
    #[error("Invalid service-account credentials: {detail}")]
    InvalidCredentials { detail: String },

    /// A required credential is absent from the environment.
    #[error("Missing credential for '{service}'.\n{hint}")]
    MissingCredential { service: String, hint: String },

    /// Token minting or exchange with the OAuth endpoint failed.
    #[error("Authentication failed: {detail}")]
    AuthFailed { detail: String },

    // ── OCR boundary ──────────────────────────────────────────────────────
    /// The recognition request could not be completed (transport or HTTP
    /// error). Converted to a diagnostic by the OCR adapter; callers of the
    /// adapter never see this variant.
    #[error("Handwriting recognition request failed: {detail}")]
    OcrRequestFailed { detail: String },

    // ── Rewrite errors ────────────────────────────────────────────────────
    /// The generative-text boundary errored or returned a malformed
    /// response. Fatal to the current rewrite attempt; the document stays
    /// in its prior state and the caller may retry from the same raw text.
    #[error("AI rewrite failed: {detail}")]
    RewriteFailed { detail: String },

    /// The rewrite call exceeded the configured timeout — a retryable
    /// sub-case of rewrite failure.
    #[error("AI rewrite timed out after {secs}s\nIncrease --api-timeout or retry.")]
    RewriteTimeout { secs: u64 },

    // ── State errors ──────────────────────────────────────────────────────
    /// A document operation was invoked before its prerequisite transition —
    /// a caller bug, not a runtime condition to recover from.
    #[error("Invalid document state: expected {expected}, but the document is {actual}")]
    InvalidState {
        expected: DocumentState,
        actual: DocumentState,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Ink2TextError {
    /// Whether retrying the failed operation with identical input could
    /// plausibly succeed. Only rewrite failures qualify: the transition is
    /// idempotent given the same raw text, and most generative-API errors
    /// (quota, overload, timeout) are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Ink2TextError::RewriteFailed { .. } | Ink2TextError::RewriteTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_image_display() {
        let e = Ink2TextError::UnsupportedImage {
            path: PathBuf::from("notes.bmp"),
            magic: [0x42, 0x4D, 0x8A, 0x00],
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.bmp"), "got: {msg}");
        assert!(msg.contains("--text"), "got: {msg}");
    }

    #[test]
    fn invalid_state_display() {
        let e = Ink2TextError::InvalidState {
            expected: DocumentState::Ready,
            actual: DocumentState::Recognized,
        };
        let msg = e.to_string();
        assert!(msg.contains("ready"));
        assert!(msg.contains("recognized"));
    }

    #[test]
    fn rewrite_timeout_display() {
        let e = Ink2TextError::RewriteTimeout { secs: 60 };
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn retryable_kinds() {
        assert!(Ink2TextError::RewriteFailed {
            detail: "HTTP 503".into()
        }
        .is_retryable());
        assert!(Ink2TextError::RewriteTimeout { secs: 30 }.is_retryable());
        assert!(!Ink2TextError::InvalidConfig("bad".into()).is_retryable());
        assert!(!Ink2TextError::FileNotFound {
            path: PathBuf::from("x.png")
        }
        .is_retryable());
    }
}
