//! Chat-completion provider implementations

use async_trait::async_trait;

pub mod openai;

// Re-export for convenience
pub use openai::OpenAiClient;

/// Remote chat-completion call, injected into the client so
/// tests can substitute a scripted double for the real API.
#[async_trait]
pub trait ChatApi: Send + Sync
{   /// Issue one chat-completion request and return the raw
    /// response. Every failure mode surfaces as an `Error`;
    /// retry and fallback are the caller's concern.
    async fn chat(
      &self
    , request: &openai::OpenAiChatRequest
    ) -> Result<openai::OpenAiChatResponse, crate::error::Error>;
}
