//! Request and reply types for the model contract

use finsight_core::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptor of a capability exposed to the model for function selection
///
/// The `parameters` value is a JSON-Schema-like object describing the
/// arguments the capability accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Capability name (unique key within a registry)
    pub name: String,

    /// Description that helps the model decide when to select it
    pub description: String,

    /// JSON schema for the capability's arguments
    pub parameters: Value,
}

impl FunctionSpec {
    /// Create a new function descriptor
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A single model turn: directive + history + optional function descriptors
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Conversation history
    pub messages: Vec<ChatMessage>,

    /// System directive for this turn
    pub system: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature (routing runs cold, narration warmer)
    pub temperature: Option<f32>,

    /// Capabilities the model may select from
    pub functions: Option<Vec<FunctionSpec>>,
}

/// What the model returned for one turn
///
/// The `arguments` blob of a function call is kept as the raw string the
/// model emitted: it may be malformed JSON, and the caller decides how to
/// degrade (the orchestrator treats a parse failure as an empty invocation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Free-text answer
    Text(String),

    /// Request to invoke a capability
    FunctionCall {
        /// Selected capability name
        name: String,
        /// Raw argument blob as emitted by the model
        arguments: String,
    },
}

impl ModelReply {
    /// Free text of the reply, if it is one
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::FunctionCall { .. } => None,
        }
    }
}

impl ChatRequest {
    /// Create a builder for chat requests
    pub fn builder(model: impl Into<String>) -> ChatRequestBuilder {
        ChatRequestBuilder::new(model)
    }
}

/// Builder for `ChatRequest`
pub struct ChatRequestBuilder {
    model: String,
    messages: Vec<ChatMessage>,
    system: Option<String>,
    max_tokens: usize,
    temperature: Option<f32>,
    functions: Option<Vec<FunctionSpec>>,
}

impl ChatRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens: 1024,
            temperature: None,
            functions: None,
        }
    }

    /// Set the conversation messages
    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Add a single message
    pub fn add_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the system directive
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Expose capability descriptors for function selection
    pub fn functions(mut self, functions: Vec<FunctionSpec>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Build the request
    pub fn build(self) -> ChatRequest {
        ChatRequest {
            model: self.model,
            messages: self.messages,
            system: self.system,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            functions: self.functions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = ChatRequest::builder("gpt-4o-mini")
            .add_message(ChatMessage::user("price of TCS?"))
            .system("You route financial queries.")
            .max_tokens(512)
            .temperature(0.2)
            .build();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.functions.is_none());
    }

    #[test]
    fn test_function_spec() {
        let spec = FunctionSpec::new(
            "get_stock_price",
            "Fetch live stock quotes",
            json!({"type": "object", "properties": {}}),
        );
        assert_eq!(spec.name, "get_stock_price");
        assert_eq!(spec.parameters["type"], "object");
    }

    #[test]
    fn test_reply_text_accessor() {
        assert_eq!(ModelReply::Text("hi".into()).text(), Some("hi"));
        let call = ModelReply::FunctionCall {
            name: "get_stock_price".into(),
            arguments: "{}".into(),
        };
        assert_eq!(call.text(), None);
    }
}
