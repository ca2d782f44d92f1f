//! LlmProvider trait definition.
//!
//! This is the core abstraction that every chat-completion backend implements.
//! Implementations live in infraplan-infra (e.g., `OpenAiCompatibleProvider`).

use std::future::Future;

use infraplan_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for chat-completion backends (OpenAI, Azure OpenAI, test doubles).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap in
/// [`super::box_provider::BoxLlmProvider`] for dynamic dispatch.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "azure_openai", "openai").
    fn name(&self) -> &str;

    /// Model (or deployment) used when a request leaves `model` empty.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// When `request.output_config` is set, the reply content must be JSON
    /// matching the attached schema.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
