//! Language-model collaborator for the finsight assistant
//!
//! The model is treated as an opaque capability: given a system directive,
//! the conversation history and the capability descriptors, it returns either
//! free text or a request to invoke one capability. This crate provides:
//!
//! - Request/reply types for that contract
//! - The `ChatModel` trait implemented by concrete providers
//! - An OpenAI-compatible chat-completions provider

pub mod error;
pub mod provider;
pub mod providers;
pub mod request;

pub use error::{LlmError, Result};
pub use provider::ChatModel;
pub use request::{ChatRequest, ChatRequestBuilder, FunctionSpec, ModelReply};
