//! Chat message types used at the inbound boundary
//!
//! The HTTP endpoint accepts an ordered history of `{role, content}` pairs;
//! the same shape is forwarded to the language-model collaborator.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// End user
    User,
    /// The assistant
    Assistant,
    /// System directive (injected server-side, never accepted inbound)
    System,
}

/// A single message in the conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: ChatRole,
    /// Plain-text content
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let msg = ChatMessage::user("what is TCS trading at?");
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"role\":\"user\""));

        let back: ChatMessage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.role, ChatRole::User);
        assert_eq!(back.content, "what is TCS trading at?");
    }
}
