//! LLM Oracle
//!
//! The model is an opaque text-to-text capability behind `LlmClient`.
//! Providers: Gemini (default), Anthropic, OpenAI.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

mod anthropic;
pub mod client;
mod error;
mod gemini;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::{LlmConfig, ProviderKind};

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider_kind() {
        Some(ProviderKind::Gemini) => Ok(Arc::new(GeminiClient::from_config(config)?)),
        Some(ProviderKind::Anthropic) => Ok(Arc::new(AnthropicClient::from_config(config)?)),
        Some(ProviderKind::OpenAI) => Ok(Arc::new(OpenAIClient::from_config(config)?)),
        None => Err(LlmError::UnknownProvider(config.provider.clone())),
    }
}

/// One Oracle call: prompt in, non-empty text out, bounded by `timeout`
///
/// Expiry is reported as `LlmError::Timeout`; the in-flight request is
/// dropped with the future.
pub async fn ask(llm: &dyn LlmClient, request: CompletionRequest, timeout: Duration) -> Result<String, LlmError> {
    debug!(model = %llm.model(), ?timeout, "ask: called");
    let response = tokio::time::timeout(timeout, llm.complete(request))
        .await
        .map_err(|_| LlmError::Timeout(timeout))??;

    info!(
        model = %llm.model(),
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        stop_reason = ?response.stop_reason,
        "Oracle call complete"
    );

    response
        .content
        .filter(|t| !t.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}
