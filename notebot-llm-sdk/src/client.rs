use crate::{
    error::LlmError,
    types::{CompletionRequest, CompletionResponse, StreamChunk},
};
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

/// Boxed stream of completion chunks
pub type StreamResult = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

/// Core trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Get provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Get model name (e.g., "gpt-4o-mini-2024-07-18")
    fn model_name(&self) -> &str;

    /// Stream a completion.
    ///
    /// Text arrives as it is generated. Tool calls are only reported on the
    /// final chunk, once their arguments are complete.
    fn stream_complete(&self, request: CompletionRequest) -> Result<StreamResult, LlmError>;
}
