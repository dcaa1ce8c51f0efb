//! Generation backend seam and its Anthropic implementation.

pub mod claude;
pub mod error;
#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

pub use claude::ClaudeAiClient;
pub use error::GenerationError;

/// HTTP request timeout for generation calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Metadata about an AI client implementation.
#[derive(Clone, Debug)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens requested per response.
    pub max_response_length: usize,
}

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Trait for generation backends.
///
/// One call per pipeline invocation; implementations must not retry.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the raw response text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}
