//! AI rewriting: build the correction prompt and call the generative
//! model.
//!
//! This module is intentionally thin — the instruction template lives in
//! [`crate::prompts`] so it can be changed without touching transport or
//! error handling here, and retry policy belongs to the caller: unlike
//! recognition, a failed rewrite has no safe local fallback (there is no
//! "empty correction"), so the engine makes exactly one attempt and
//! surfaces the failure as a distinct error kind for the caller to act on.

use crate::error::Ink2TextError;
use crate::prompts::build_rewrite_prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Base URL of the Gemini text-generation API.
pub const GEMINI_ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A remote generative-text backend: one free-form prompt in, one
/// free-form text response out. No streaming, no multi-turn state.
#[async_trait]
pub trait TextRewriter: Send + Sync {
    /// Backend name for log lines.
    fn name(&self) -> &str;

    /// Complete one prompt. Failures should use the rewrite-failure error
    /// kinds ([`Ink2TextError::RewriteFailed`] / [`Ink2TextError::RewriteTimeout`]).
    async fn complete(&self, prompt: &str) -> Result<String, Ink2TextError>;
}

/// Wraps a [`TextRewriter`] with the fixed correction prompt.
pub struct RewriteEngine {
    rewriter: Arc<dyn TextRewriter>,
}

impl RewriteEngine {
    /// The rewriter arrives already authenticated; the engine holds no
    /// credentials and no state between calls.
    pub fn new(rewriter: Arc<dyn TextRewriter>) -> Self {
        Self { rewriter }
    }

    /// Rewrite one block of recognized text into corrected, numbered
    /// prose. Accepts any input, including empty; the response is returned
    /// with leading/trailing whitespace trimmed.
    pub async fn rewrite(&self, raw_text: &str) -> Result<String, Ink2TextError> {
        let prompt = build_rewrite_prompt(raw_text);
        debug!(
            "RewriteEngine: sending {} prompt chars to {}",
            prompt.len(),
            self.rewriter.name()
        );
        let response = self.rewriter.complete(&prompt).await?;
        Ok(response.trim().to_string())
    }
}

// ── Gemini backend ───────────────────────────────────────────────────────

/// [`TextRewriter`] backed by the Gemini `generateContent` API.
pub struct GeminiRewriter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    timeout_secs: u64,
}

impl GeminiRewriter {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            max_output_tokens: None,
            timeout_secs: 60,
        }
    }

    /// Override the generation parameters; `None` leaves the service
    /// defaults in place.
    pub fn with_generation(mut self, temperature: Option<f32>, max_output_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Record the HTTP client's timeout so timeout errors can report it.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

// ── Gemini API request/response types ────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[async_trait]
impl TextRewriter for GeminiRewriter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, Ink2TextError> {
        let url = format!("{GEMINI_ENDPOINT_BASE}/{}:generateContent", self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.generation_config(),
        };

        info!("GeminiRewriter: calling {}:generateContent", self.model);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Ink2TextError::RewriteTimeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    Ink2TextError::RewriteFailed {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Ink2TextError::RewriteFailed {
                detail: format!("HTTP {status}: {text}"),
            });
        }

        let response: GenerateResponse =
            resp.json().await.map_err(|e| Ink2TextError::RewriteFailed {
                detail: format!("failed to parse generation response: {e}"),
            })?;

        // A safety block or an exhausted quota can yield a well-formed
        // response with no usable candidate; that is still a failed rewrite.
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Ink2TextError::RewriteFailed {
                detail: "response contained no text candidates".into(),
            });
        }

        debug!("GeminiRewriter: received {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CapturingRewriter {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    #[async_trait]
    impl TextRewriter for CapturingRewriter {
        fn name(&self) -> &str {
            "capturing"
        }

        async fn complete(&self, prompt: &str) -> Result<String, Ink2TextError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn engine_embeds_raw_text_and_trims_reply() {
        let rewriter = Arc::new(CapturingRewriter {
            prompts: Mutex::new(Vec::new()),
            reply: "  **1.** Halo dunia\n\n".into(),
        });
        let engine = RewriteEngine::new(rewriter.clone());

        let out = engine.rewrite("halo dunia mentah").await.unwrap();
        assert_eq!(out, "**1.** Halo dunia");

        let prompts = rewriter.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("halo dunia mentah"));
    }

    #[tokio::test]
    async fn engine_propagates_rewrite_failure() {
        struct FailingRewriter;

        #[async_trait]
        impl TextRewriter for FailingRewriter {
            fn name(&self) -> &str {
                "failing"
            }

            async fn complete(&self, _prompt: &str) -> Result<String, Ink2TextError> {
                Err(Ink2TextError::RewriteFailed {
                    detail: "quota exceeded".into(),
                })
            }
        }

        let engine = RewriteEngine::new(Arc::new(FailingRewriter));
        let err = engine.rewrite("teks").await.unwrap_err();
        assert!(matches!(err, Ink2TextError::RewriteFailed { .. }));
    }

    #[test]
    fn generate_request_serialises_to_the_gemini_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "perbaiki ini".into(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.2),
                max_output_tokens: Some(1024),
            }),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "perbaiki ini");
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn generation_config_is_omitted_when_unset() {
        let rewriter = GeminiRewriter::new(reqwest::Client::new(), "key", "gemini-test");
        let body = GenerateRequest {
            contents: vec![],
            generation_config: rewriter.generation_config(),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert!(v.get("generationConfig").is_none());
    }

    #[test]
    fn generate_response_parses_candidate_parts() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "1. Halo " }, { "text": "dunia" }], "role": "model" },
                "finishReason": "STOP"
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        assert_eq!(text, "1. Halo dunia");
    }

    #[test]
    fn empty_candidates_parse_as_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
