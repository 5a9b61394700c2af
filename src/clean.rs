//! One-shot cleanup entry points.
//!
//! [`clean`] sequences the whole pipeline for a single input file:
//! acquisition, recognition (or direct text supply), the AI rewrite with
//! caller-level retry, and markup normalisation. It is the API most
//! callers want; drive [`crate::document::Document`] directly when the
//! stages need to be interleaved with other work (a UI, say).
//!
//! Retry lives here and not in the engine: the engine makes exactly one
//! attempt per call, and this layer — its caller — re-runs the transition
//! with exponential backoff, which is safe because a failed rewrite leaves
//! the document untouched.

use crate::config::{CleanupConfig, OutputFormat};
use crate::document::Document;
use crate::error::Ink2TextError;
use crate::output::{CleanupOutput, CleanupStats};
use crate::pipeline::acquire::{self, AcquiredInput};
use crate::pipeline::ocr::{GoogleVisionRecognizer, HandwritingRecognizer, OcrAdapter};
use crate::pipeline::rewrite::{GeminiRewriter, RewriteEngine, TextRewriter};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

/// Clean one handwritten document.
///
/// # Arguments
/// * `input` — path to an image (or, with
///   [`crate::config::InputKind::PreRecognizedText`], a text file)
/// * `config` — pipeline configuration, including injected service
///   handles for tests and embedders
///
/// # Returns
/// `Ok(CleanupOutput)` with all three renditions. When recognition finds
/// no text the output is degenerate — empty renditions plus the boundary's
/// diagnostic — and **no generative call is made**: there is nothing to
/// correct, and the caller decides what to tell the user.
///
/// # Errors
/// Returns `Err(Ink2TextError)` for unreadable input, missing/invalid
/// credentials, and rewrite failures that survive the retry budget.
pub async fn clean(
    input: impl AsRef<str>,
    config: &CleanupConfig,
) -> Result<CleanupOutput, Ink2TextError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting cleanup: {}", input);

    // ── Step 1: Acquire input ────────────────────────────────────────────
    let acquired = acquire::resolve_input(input, config.input_kind)?;

    // ── Step 2: Recognize (or supply) the raw text ───────────────────────
    let ocr_start = Instant::now();
    let mut document = Document::new();
    match acquired {
        AcquiredInput::Image(bytes) => {
            let recognizer = resolve_recognizer(config)?;
            let adapter = OcrAdapter::new(recognizer);
            document.recognize(&adapter, &bytes).await;
        }
        AcquiredInput::PreRecognized(text) => document.supply_text(text),
    }
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    let raw_text = document.raw_text()?.to_string();
    let diagnostic = document.diagnostic().map(String::from);

    // ── Step 3: Short-circuit the degenerate case ────────────────────────
    if raw_text.is_empty() {
        warn!("No text recognized; skipping the rewrite stage");
        return Ok(CleanupOutput {
            raw_text,
            rewritten_text: String::new(),
            plain_text: String::new(),
            diagnostic,
            stats: CleanupStats {
                ocr_duration_ms,
                rewrite_duration_ms: 0,
                total_duration_ms: total_start.elapsed().as_millis() as u64,
                rewrite_retries: 0,
            },
        });
    }

    // ── Step 4: Rewrite with retry, then normalise ───────────────────────
    let rewriter = resolve_rewriter(config)?;
    let engine = RewriteEngine::new(rewriter);

    let rewrite_start = Instant::now();
    let mut retries = 0u32;
    loop {
        match document.rewrite(&engine).await {
            Ok(()) => break,
            Err(e) if retries < config.max_retries && e.is_retryable() => {
                let backoff = config.retry_backoff_ms * 2u64.pow(retries);
                warn!(
                    "Rewrite attempt {}/{} failed ({}); retrying in {}ms",
                    retries + 1,
                    config.max_retries + 1,
                    e,
                    backoff
                );
                sleep(Duration::from_millis(backoff)).await;
                retries += 1;
            }
            Err(e) => return Err(e),
        }
    }
    let rewrite_duration_ms = rewrite_start.elapsed().as_millis() as u64;

    let output = CleanupOutput {
        rewritten_text: document.select(OutputFormat::Marked)?.to_string(),
        plain_text: document.select(OutputFormat::Plain)?.to_string(),
        raw_text,
        diagnostic,
        stats: CleanupStats {
            ocr_duration_ms,
            rewrite_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            rewrite_retries: retries,
        },
    };

    info!(
        "Cleanup complete: {} raw chars → {} plain chars in {}ms",
        output.raw_text.len(),
        output.plain_text.len(),
        output.stats.total_duration_ms
    );

    Ok(output)
}

/// Synchronous wrapper around [`clean`].
///
/// Creates a temporary tokio runtime internally.
pub fn clean_sync(
    input: impl AsRef<str>,
    config: &CleanupConfig,
) -> Result<CleanupOutput, Ink2TextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Ink2TextError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(clean(input, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn http_client(config: &CleanupConfig) -> Result<reqwest::Client, Ink2TextError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| Ink2TextError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Resolve the handwriting recognizer, from most-specific to
/// least-specific:
///
/// 1. **Injected handle** (`config.recognizer`) — the caller constructed
///    and authenticated it; used as-is. This is how tests run without a
///    network.
/// 2. **Inline key blob** (`GOOGLE_APPLICATION_CREDENTIALS_JSON`) — the
///    whole service-account key in the environment, the deployment style
///    of PaaS hosts with no writable filesystem.
/// 3. **Key file path** (`GOOGLE_APPLICATION_CREDENTIALS`) — the standard
///    Google SDK variable.
fn resolve_recognizer(
    config: &CleanupConfig,
) -> Result<Arc<dyn HandwritingRecognizer>, Ink2TextError> {
    if let Some(ref recognizer) = config.recognizer {
        return Ok(Arc::clone(recognizer));
    }

    let key = if let Ok(blob) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS_JSON") {
        crate::auth::ServiceAccountKey::from_json(&blob)?
    } else if let Ok(path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
        crate::auth::ServiceAccountKey::from_file(&path)?
    } else {
        return Err(Ink2TextError::MissingCredential {
            service: "google-vision".into(),
            hint: "Set GOOGLE_APPLICATION_CREDENTIALS_JSON to the service-account key JSON,\n\
                   or GOOGLE_APPLICATION_CREDENTIALS to its file path."
                .into(),
        });
    };

    let client = http_client(config)?;
    let tokens = crate::auth::TokenSource::new(key);
    Ok(Arc::new(GoogleVisionRecognizer::new(client, tokens)))
}

/// Resolve the text rewriter: the injected handle first, else a Gemini
/// client from `GEMINI_API_KEY`.
fn resolve_rewriter(config: &CleanupConfig) -> Result<Arc<dyn TextRewriter>, Ink2TextError> {
    if let Some(ref rewriter) = config.rewriter {
        return Ok(Arc::clone(rewriter));
    }

    let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Ink2TextError::MissingCredential {
        service: "gemini".into(),
        hint: "Set GEMINI_API_KEY to your Gemini API key.".into(),
    })?;

    let client = http_client(config)?;
    Ok(Arc::new(
        GeminiRewriter::new(client, api_key, config.model.clone())
            .with_generation(config.temperature, config.max_output_tokens)
            .with_timeout_secs(config.api_timeout_secs),
    ))
}
