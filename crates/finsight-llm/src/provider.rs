//! Chat model trait definition

use crate::{ChatRequest, ModelReply, Result};
use async_trait::async_trait;

/// Trait for language-model providers
///
/// Implementations talk to a concrete model service. The orchestrator calls
/// this once per turn: a routing turn with function descriptors attached,
/// and (when a capability was selected) a narration turn without them.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one model turn
    ///
    /// Returns either free text or a function-invocation request. A reply
    /// with neither is surfaced as empty text so the caller can fall back to
    /// a clarification prompt.
    async fn chat(&self, request: ChatRequest) -> Result<ModelReply>;

    /// Provider name (e.g. "openai")
    fn name(&self) -> &str;
}
