//! Handwriting recognition: the OCR boundary and its adapter.
//!
//! The adapter's contract is unusual and worth stating up front: it never
//! fails. A blank photo, an unreadable scrawl, an expired credential, and
//! a Vision outage all produce the same shape — an empty recognized text,
//! with the cause (if any) carried as a diagnostic string and logged.
//! Downstream stages then handle exactly one degenerate case ("nothing was
//! recognized") instead of four.
//!
//! The remote boundary itself is the [`HandwritingRecognizer`] trait, so
//! tests inject canned responses and alternative backends slot in without
//! touching the adapter.

use crate::auth::TokenSource;
use crate::error::Ink2TextError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Endpoint of the Google Cloud Vision annotation API.
pub const VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// What the remote recognition boundary reports for one image: the
/// flattened full text it detected (if any) and an optional service-level
/// error message. The adapter depends on nothing else in the response.
#[derive(Debug, Clone, Default)]
pub struct RecognizerResponse {
    pub full_text: Option<String>,
    pub error: Option<String>,
}

/// A remote handwriting-recognition backend.
#[async_trait]
pub trait HandwritingRecognizer: Send + Sync {
    /// Backend name for log lines.
    fn name(&self) -> &str;

    /// Recognize the handwriting in one image.
    ///
    /// `Err` is reserved for failures to complete the exchange at all
    /// (transport, auth); an error *reported by* the service belongs in
    /// [`RecognizerResponse::error`]. The adapter collapses both into a
    /// diagnostic either way.
    async fn recognize(&self, image: &[u8]) -> Result<RecognizerResponse, Ink2TextError>;
}

/// Result of one adapter call: recognized text, possibly empty, plus the
/// diagnostic side channel for the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    /// The layout-flattened recognized text, verbatim. Empty when nothing
    /// was recognized or the boundary failed.
    pub text: String,
    /// Why the text is empty, when the boundary could say. `None` for a
    /// successful call — including one that genuinely found no text.
    pub diagnostic: Option<String>,
}

/// Wraps a [`HandwritingRecognizer`] with the never-raise contract.
pub struct OcrAdapter {
    recognizer: Arc<dyn HandwritingRecognizer>,
}

impl OcrAdapter {
    /// The recognizer arrives already authenticated; the adapter holds no
    /// credentials and no state between calls.
    pub fn new(recognizer: Arc<dyn HandwritingRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Recognize handwriting in `image`. Infallible: every failure mode
    /// resolves to empty text plus a diagnostic.
    pub async fn recognize(&self, image: &[u8]) -> Recognition {
        match self.recognizer.recognize(image).await {
            Ok(response) => {
                if let Some(message) = response.error {
                    warn!("{} reported an error: {}", self.recognizer.name(), message);
                    return Recognition {
                        text: String::new(),
                        diagnostic: Some(message),
                    };
                }
                let text = response.full_text.unwrap_or_default();
                debug!("{} recognized {} chars", self.recognizer.name(), text.len());
                Recognition {
                    text,
                    diagnostic: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("{} call failed: {}", self.recognizer.name(), message);
                Recognition {
                    text: String::new(),
                    diagnostic: Some(message),
                }
            }
        }
    }
}

// ── Google Cloud Vision backend ──────────────────────────────────────────

/// [`HandwritingRecognizer`] backed by the Vision `images:annotate` API
/// with `DOCUMENT_TEXT_DETECTION` — the dense-text model tuned for
/// handwriting, as opposed to the sparse `TEXT_DETECTION` mode.
pub struct GoogleVisionRecognizer {
    client: reqwest::Client,
    tokens: TokenSource,
}

impl GoogleVisionRecognizer {
    pub fn new(client: reqwest::Client, tokens: TokenSource) -> Self {
        Self { client, tokens }
    }
}

// ── Vision API request/response types ────────────────────────────────────

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: ImageSource,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageSource {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct FullTextAnnotation {
    text: String,
}

#[derive(Deserialize)]
struct Status {
    message: Option<String>,
}

#[async_trait]
impl HandwritingRecognizer for GoogleVisionRecognizer {
    fn name(&self) -> &str {
        "google_vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<RecognizerResponse, Ink2TextError> {
        let token = self.tokens.token(&self.client).await?;

        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageSource {
                    content: BASE64.encode(image),
                },
                features: vec![Feature {
                    kind: "DOCUMENT_TEXT_DETECTION".to_string(),
                }],
            }],
        };

        info!(
            "GoogleVisionRecognizer: calling images:annotate ({} image bytes)",
            image.len()
        );

        let resp = self
            .client
            .post(VISION_ENDPOINT)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Ink2TextError::OcrRequestFailed {
                detail: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Ink2TextError::OcrRequestFailed {
                detail: format!("HTTP {status}: {text}"),
            });
        }

        let annotate: AnnotateResponse =
            resp.json().await.map_err(|e| Ink2TextError::OcrRequestFailed {
                detail: format!("failed to parse annotation response: {e}"),
            })?;

        let first = annotate.responses.into_iter().next().unwrap_or_default();

        Ok(RecognizerResponse {
            full_text: first.full_text_annotation.map(|a| a.text),
            error: first.error.and_then(|s| s.message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedRecognizer(Result<RecognizerResponse, Ink2TextError>);

    #[async_trait]
    impl HandwritingRecognizer for CannedRecognizer {
        fn name(&self) -> &str {
            "canned"
        }

        async fn recognize(&self, _image: &[u8]) -> Result<RecognizerResponse, Ink2TextError> {
            match &self.0 {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(Ink2TextError::OcrRequestFailed {
                    detail: e.to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn successful_recognition_passes_text_through() {
        let adapter = OcrAdapter::new(Arc::new(CannedRecognizer(Ok(RecognizerResponse {
            full_text: Some("halo\ndunia".into()),
            error: None,
        }))));
        let recognition = adapter.recognize(b"img").await;
        assert_eq!(recognition.text, "halo\ndunia");
        assert!(recognition.diagnostic.is_none());
    }

    #[tokio::test]
    async fn service_error_becomes_empty_text_plus_diagnostic() {
        let adapter = OcrAdapter::new(Arc::new(CannedRecognizer(Ok(RecognizerResponse {
            full_text: Some("partial text that must be discarded".into()),
            error: Some("image too large".into()),
        }))));
        let recognition = adapter.recognize(b"img").await;
        assert_eq!(recognition.text, "");
        assert_eq!(recognition.diagnostic.as_deref(), Some("image too large"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_empty_text_plus_diagnostic() {
        let adapter = OcrAdapter::new(Arc::new(CannedRecognizer(Err(
            Ink2TextError::OcrRequestFailed {
                detail: "connection refused".into(),
            },
        ))));
        let recognition = adapter.recognize(b"img").await;
        assert_eq!(recognition.text, "");
        assert!(recognition
            .diagnostic
            .as_deref()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn blank_image_yields_empty_text_without_diagnostic() {
        let adapter = OcrAdapter::new(Arc::new(CannedRecognizer(Ok(
            RecognizerResponse::default(),
        ))));
        let recognition = adapter.recognize(b"img").await;
        assert_eq!(recognition.text, "");
        assert!(recognition.diagnostic.is_none());
    }

    #[test]
    fn annotate_request_serialises_to_the_vision_shape() {
        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageSource {
                    content: BASE64.encode(b"bytes"),
                },
                features: vec![Feature {
                    kind: "DOCUMENT_TEXT_DETECTION".into(),
                }],
            }],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(
            v["requests"][0]["features"][0]["type"],
            "DOCUMENT_TEXT_DETECTION"
        );
        assert!(v["requests"][0]["image"]["content"].is_string());
    }

    #[test]
    fn annotate_response_parses_both_fields() {
        let json = r#"{
            "responses": [{
                "fullTextAnnotation": { "text": "tulisan tangan", "pages": [] },
                "error": { "code": 3, "message": "partial failure" }
            }]
        }"#;
        let parsed: AnnotateResponse = serde_json::from_str(json).unwrap();
        let first = parsed.responses.into_iter().next().unwrap();
        assert_eq!(first.full_text_annotation.unwrap().text, "tulisan tangan");
        assert_eq!(first.error.unwrap().message.as_deref(), Some("partial failure"));
    }

    #[test]
    fn empty_annotate_response_parses() {
        let parsed: AnnotateResponse = serde_json::from_str(r#"{"responses": [{}]}"#).unwrap();
        let first = parsed.responses.into_iter().next().unwrap();
        assert!(first.full_text_annotation.is_none());
        assert!(first.error.is_none());
    }
}
