//! LLM error types

use std::time::Duration;

use thiserror::Error;

/// LLM operation errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),

    #[error("Unknown LLM provider: '{0}'. Supported: gemini, anthropic, openai")]
    UnknownProvider(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_messages() {
        assert_eq!(LlmError::Timeout(Duration::from_secs(60)).to_string(), "Timeout after 60s");
        assert_eq!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(1)
            }
            .to_string(),
            "Rate limited, retry after 1s"
        );
    }

    #[test]
    fn test_missing_key_message() {
        let err = LlmError::MissingApiKey("GEMINI_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "LLM API key not found. Set the GEMINI_API_KEY environment variable."
        );
    }
}
