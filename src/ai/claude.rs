//! Anthropic Messages API client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{build_http_client, AiClient, AiClientMetadata, GenerationError};
use crate::utils::settings::{get_env_var_or, get_env_vars};

/// Model used when `ANTHROPIC_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// API base used when `ANTHROPIC_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Output token cap per changelog.
pub const MAX_TOKENS: u32 = 4000;

/// Sampling temperature.
pub const TEMPERATURE: f32 = 0.3;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
    usage: Option<Usage>,
}

/// Claude API client.
pub struct ClaudeAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeAiClient {
    /// Creates a client for `model` against the public API.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom API base.
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from `CLAUDE_API_KEY`/`ANTHROPIC_API_KEY`,
    /// `ANTHROPIC_MODEL` and `ANTHROPIC_BASE_URL`, with settings-file fallback.
    pub fn from_env(model_override: Option<&str>) -> Result<Self> {
        let api_key = get_env_vars(&["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"])
            .map_err(|_| GenerationError::ApiKeyNotFound)?;
        let model = model_override
            .map(str::to_string)
            .unwrap_or_else(|| get_env_var_or("ANTHROPIC_MODEL", DEFAULT_MODEL));
        let base_url = get_env_var_or("ANTHROPIC_BASE_URL", DEFAULT_BASE_URL);

        Self::with_base_url(model, api_key, base_url)
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

impl AiClient for ClaudeAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                "Preparing Claude API request"
            );

            let request = ClaudeRequest {
                model: &self.model,
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                system: system_prompt,
                messages: vec![Message {
                    role: "user",
                    content: user_prompt,
                }],
            };

            let url = self.messages_url();
            info!(url = %url, model = %self.model, "Sending request to Claude API");

            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(GenerationError::RateLimitExceeded.into());
            }
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_else(|e| {
                    debug!("Failed to read error response body: {e}");
                    String::new()
                });
                return Err(
                    GenerationError::ApiRequestFailed(format!("HTTP {status}: {error_text}"))
                        .into(),
                );
            }

            let claude_response: ClaudeResponse = response
                .json()
                .await
                .map_err(|e| GenerationError::InvalidResponseFormat(e.to_string()))?;

            if let Some(usage) = &claude_response.usage {
                debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    total_tokens = usage.input_tokens + usage.output_tokens,
                    "Claude API usage"
                );
            }

            let text = claude_response
                .content
                .into_iter()
                .find(|c| c.content_type == "text")
                .map(|c| c.text)
                .ok_or_else(|| {
                    GenerationError::InvalidResponseFormat("No text content in response".to_string())
                })?;

            debug!(response_len = text.len(), "Extracted text from Claude API response");
            Ok(text)
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Anthropic".to_string(),
            model: self.model.clone(),
            max_response_length: MAX_TOKENS as usize,
        }
    }
}
