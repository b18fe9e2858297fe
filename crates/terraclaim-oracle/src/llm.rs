//! LLM backend abstraction and implementations.
//!
//! Defines an enum-based dispatch for LLM backends, avoiding the
//! dyn-compatibility issues with async trait methods. Concrete
//! implementations exist for OpenAI-compatible APIs and the Anthropic
//! Messages API. All backends communicate over HTTP via `reqwest`.
//!
//! The oracle does not care which model is behind the API -- it sends the
//! pricing context and expects a text response containing a JSON
//! suggestion.

use std::time::Duration;

use serde::Deserialize;

use crate::error::OracleError;
use crate::parse::parse_suggestion;
use crate::suggestion::{CostSuggestion, CostSuggestionOracle, SuggestionRequest};

/// System prompt shared by all backends.
const SYSTEM_PROMPT: &str = "You price territory unlocks in a survival game. \
    Given a chunk's biome, terrain score, difficulty, and the player's \
    progression, answer with a single JSON object: \
    {\"material\": \"<snake_case material key>\", \"amount\": <integer>, \
    \"reasoning\": \"<one sentence>\"}. Pick materials a player could \
    plausibly gather and keep amounts between 1 and 64.";

/// Which API dialect a backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleBackendKind {
    /// OpenAI-compatible chat completions API.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

/// Connection settings for an LLM backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmOracleConfig {
    /// Which API dialect to speak.
    pub backend: OracleBackendKind,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key.
    pub api_key: String,
    /// Model identifier; also part of the engine's config fingerprint.
    pub model: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

/// An LLM-backed cost oracle.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
pub enum LlmCostOracle {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmCostOracle {
    /// Create an oracle from configuration.
    pub fn from_config(config: &LlmOracleConfig) -> Self {
        match config.backend {
            OracleBackendKind::OpenAi => Self::OpenAi(OpenAiBackend::new(config)),
            OracleBackendKind::Anthropic => Self::Anthropic(AnthropicBackend::new(config)),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

impl CostSuggestionOracle for LlmCostOracle {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<CostSuggestion, OracleError> {
        let raw = match self {
            Self::OpenAi(backend) => backend.complete(request).await?,
            Self::Anthropic(backend) => backend.complete(request).await?,
        };
        parse_suggestion(&raw)
    }
}

/// Serialize the pricing context into the user message.
fn user_prompt(request: &SuggestionRequest) -> String {
    serde_json::json!({
        "chunk": request.chunk.to_string(),
        "biome": request.biome.as_key(),
        "terrain_score": request.score,
        "difficulty": request.difficulty.as_key(),
        "chunks_already_unlocked": request.unlocked_count,
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with `OpenAI`, `DeepSeek`, and Ollama endpoints.
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmOracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    /// Send the pricing context and return the response text.
    async fn complete(&self, request: &SuggestionRequest) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(request)}
            ],
            "temperature": 0.4,
            "max_tokens": 256,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Backend(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(OracleError::Backend(format!(
                "OpenAI returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Backend(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            OracleError::Backend("OpenAI response missing choices[0].message.content".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from `OpenAI`:
/// - Uses `x-api-key` header instead of `Authorization: Bearer`
/// - System is a top-level field, not a message
/// - Response structure differs: `content[0].text`
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmOracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    /// Send the pricing context and return the response text.
    async fn complete(&self, request: &SuggestionRequest) -> Result<String, OracleError> {
        let url = format!("{}/messages", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 256,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": user_prompt(request)}
            ]
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Backend(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(OracleError::Backend(format!(
                "Anthropic returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Backend(format!("Anthropic response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            OracleError::Backend("Anthropic response missing content[0].text".to_owned())
        })
}
