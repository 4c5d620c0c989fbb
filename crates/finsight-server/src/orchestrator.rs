//! Request orchestration
//!
//! One inbound chat request drives a three-phase machine:
//!
//! - **AwaitingRouting**: the routing turn decides between answering
//!   directly and selecting a capability
//! - **Dispatching**: entered only when a capability was selected; the
//!   dispatcher runs it (partial failures stay inline in the result) and
//!   the normalizer runs opportunistically over list-of-records shapes
//! - **Narrating**: terminal; either the routing turn's text verbatim or
//!   a second model turn narrating the dispatch result
//!
//! The response always carries the raw dispatch result alongside the
//! narration so the caller can render charts independently of the prose.

use crate::prompts;
use finsight_capabilities::{Dispatcher, args};
use finsight_core::{ChatMessage, Result};
use finsight_llm::{ChatModel, ChatRequest, ModelReply};
use finsight_market::chart::{self, ChartPayload};
use finsight_market::quote::AssetQuote;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Pipeline phase, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting on the routing turn
    AwaitingRouting,
    /// Running the selected capability
    Dispatching,
    /// Producing the final prose
    Narrating,
}

/// Assembled response for one request
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Narration or direct answer
    pub content: String,
    /// Capability that ran, when one was selected
    pub function_name: Option<String>,
    /// Raw dispatch result, verbatim
    pub raw_data: Option<Value>,
    /// Normalized chart payload, when the result shape allowed it
    pub chart: Option<ChartPayload>,
}

/// End-to-end request handler
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    dispatcher: Dispatcher,
    model_name: String,
    max_tokens: usize,
}

impl Orchestrator {
    /// Create an orchestrator over injected collaborators
    pub fn new(model: Arc<dyn ChatModel>, dispatcher: Dispatcher, model_name: impl Into<String>) -> Self {
        Self {
            model,
            dispatcher,
            model_name: model_name.into(),
            max_tokens: 1024,
        }
    }

    /// Handle one chat request
    #[instrument(skip(self, messages), fields(turns = messages.len()))]
    pub async fn handle(&self, messages: Vec<ChatMessage>) -> Result<ChatOutcome> {
        debug!(phase = ?Phase::AwaitingRouting, "routing turn");

        let routing_request = ChatRequest::builder(&self.model_name)
            .messages(messages.clone())
            .system(prompts::ROUTING_DIRECTIVE)
            .temperature(prompts::ROUTING_TEMPERATURE)
            .max_tokens(self.max_tokens)
            .functions(self.dispatcher.registry().definitions())
            .build();

        let (name, arguments) = match self.model.chat(routing_request).await? {
            ModelReply::Text(text) => {
                debug!(phase = ?Phase::Narrating, "answered without data");
                let content = if text.trim().is_empty() {
                    prompts::CLARIFICATION_FALLBACK.to_string()
                } else {
                    text
                };
                return Ok(ChatOutcome {
                    content,
                    function_name: None,
                    raw_data: None,
                    chart: None,
                });
            }
            ModelReply::FunctionCall { name, arguments } => (name, arguments),
        };

        debug!(phase = ?Phase::Dispatching, capability = %name, "dispatching");

        // A malformed argument blob is an empty invocation, not a failure.
        let parsed_args = args::arguments_to_value(&arguments);
        let raw = self.dispatcher.dispatch(&name, parsed_args).await;
        let chart = chart_from_raw(&raw);

        debug!(phase = ?Phase::Narrating, "narration turn");

        let mut narration_messages = messages;
        narration_messages.push(ChatMessage::system(format!(
            "The {name} function returned this data:\n{raw}"
        )));

        let narration_request = ChatRequest::builder(&self.model_name)
            .messages(narration_messages)
            .system(prompts::NARRATION_DIRECTIVE)
            .temperature(prompts::NARRATION_TEMPERATURE)
            .max_tokens(self.max_tokens)
            .build();

        let content = match self.model.chat(narration_request).await? {
            ModelReply::Text(text) if !text.trim().is_empty() => text,
            _ => prompts::CLARIFICATION_FALLBACK.to_string(),
        };

        Ok(ChatOutcome {
            content,
            function_name: Some(name),
            raw_data: Some(raw),
            chart,
        })
    }
}

/// Normalize opportunistically: only a list of history-bearing asset
/// records produces a chart
fn chart_from_raw(raw: &Value) -> Option<ChartPayload> {
    if !raw.is_array() {
        return None;
    }
    let records: Vec<AssetQuote> = serde_json::from_value(raw.clone()).ok()?;
    chart::normalize(&records)
}
