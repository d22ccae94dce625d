// =============================================================================
// GEMINI SUMMARIZER - Google AI Studio API Integration
// =============================================================================
//
// Implements the core `Summarizer` trait on top of Gemini's `generateContent`
// endpoint (https://ai.google.dev/api/generate-content).
//
// - Authentication: API key is passed as a query parameter (`?key=API_KEY`).
// - Request format: `contents[]` with nested `parts`.
// - Response format: text lives at `candidates[0].content.parts[0].text`.
//
// Summaries are best effort. Every failure is logged here and surfaces to the
// caller as `None`.

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::news::Summarizer;

const SUMMARY_PROMPT: &str = "Summarize in 2 sentences:";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";

// =============================================================================
// GEMINI API DATA STRUCTURES
// =============================================================================

/// A single part of content. We only ever send and read text.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Generation options sent with every summary request.
/// See: https://ai.google.dev/api/generate-content#generationconfig
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Controls randomness. Range: [0.0, 2.0].
    pub temperature: f32,
    pub candidate_count: u32,
    /// Upper bound on the summary length.
    pub max_output_tokens: u32,
    /// Nucleus sampling.
    pub top_p: f32,
    /// Top-k sampling.
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            candidate_count: 1,
            max_output_tokens: 256,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    config: GenerationConfig,
}

impl GeminiSummarizer {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model,
            config: GenerationConfig::default(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(format!("{}\n{}", SUMMARY_PROMPT, text)),
                }],
            }],
            generation_config: self.config.clone(),
        }
    }

    /// First candidate's first text part, trimmed. Blank output counts as none.
    fn extract_summary(response: &GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .as_ref()?
            .first()?
            .content
            .parts
            .first()?
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    async fn request_summary(&self, text: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.map_err(|e| e.without_url())?;

            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(format!(
                    "Gemini API error ({}): {}",
                    status, error_response.error.message
                )
                .into());
            }
            return Err(format!("Gemini API error: {} - {}", status, error_text).into());
        }

        let response_json: GenerateContentResponse =
            response.json().await.map_err(|e| e.without_url())?;
        Ok(Self::extract_summary(&response_json))
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, text: &str) -> Option<String> {
        match self.request_summary(text).await {
            Ok(Some(summary)) => Some(summary),
            Ok(None) => {
                tracing::warn!("Gemini returned no summary text (possibly blocked by safety filters)");
                None
            }
            Err(e) => {
                tracing::error!("Gemini API Error: {}", e);
                None
            }
        }
    }
}

/// Used when no Gemini key is configured: every article gets the placeholder.
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, _text: &str) -> Option<String> {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
