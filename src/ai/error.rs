//! Generation backend errors.

use thiserror::Error;

/// Failures of a generation backend call.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key in the environment or settings file.
    #[error(
        "Claude API key not found. Set CLAUDE_API_KEY or ANTHROPIC_API_KEY environment variable"
    )]
    ApiKeyNotFound,

    /// The API answered with a non-success status.
    #[error("API Error: {0}")]
    ApiRequestFailed(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response format from Claude API: {0}")]
    InvalidResponseFormat(String),

    /// The API answered 429.
    #[error("Rate Limit Error: Too many requests. Please try again later.")]
    RateLimitExceeded,

    /// The API could not be reached.
    #[error("Connection Error: Unable to reach Claude API. Check your internet connection. ({0})")]
    NetworkError(String),
}
