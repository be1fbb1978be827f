//! Optional LLM critique of classification results.
//!
//! Disabled entirely when no API key is configured — the detection pipeline
//! behaves identically either way; a verdict only ever rides alongside the
//! amounts, it never changes them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use summa_core::ClassifiedAmount;

/// One request's hard ceiling. No retry on failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("LLM response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Absent key = validator disabled.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// The validator's critique of one classification result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmVerdict {
    pub valid: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

// ── Wire shapes (OpenAI-compatible chat completion) ──────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You review amounts extracted from bill text. \
Reply with JSON only: {\"valid\": bool, \"issues\": [string], \"suggestions\": [string]}.";

pub struct LlmValidator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmValidator {
    /// Build a validator, or None when no API key is configured.
    pub fn from_config(config: LlmConfig) -> Option<Self> {
        config.api_key.as_ref()?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Some(Self { client, config })
    }

    /// Ask the model to critique the classified amounts against the source
    /// text. Errors are fatal to the enclosing request; there is no retry.
    pub async fn validate(
        &self,
        text: &str,
        amounts: &[ClassifiedAmount],
    ) -> Result<LlmVerdict, LlmError> {
        let body = build_request(&self.config.model, text, amounts);
        tracing::debug!(model = %self.config.model, amounts = amounts.len(), "LLM validation call");

        let response: ChatResponse = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| LlmError::Malformed("no choices in response".to_string()))?;

        parse_verdict(content)
    }
}

fn build_request<'a>(
    model: &'a str,
    text: &str,
    amounts: &[ClassifiedAmount],
) -> ChatRequest<'a> {
    let amounts_json =
        serde_json::to_string(amounts).unwrap_or_else(|_| "[]".to_string());
    ChatRequest {
        model,
        messages: vec![
            ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
            ChatMessage {
                role: "user",
                content: format!("Source text:\n{text}\n\nClassified amounts:\n{amounts_json}"),
            },
        ],
        temperature: 0.0,
    }
}

fn parse_verdict(content: &str) -> Result<LlmVerdict, LlmError> {
    // Models wrap JSON in code fences often enough to be worth stripping.
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(trimmed).map_err(|e| LlmError::Malformed(e.to_string()))
}

// ── Tests ────────────────────────────────────────────────────────────────────
