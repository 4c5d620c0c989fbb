//! Core types shared across the finsight workspace
//!
//! This crate holds the error type every boundary converts into and the
//! chat-message shape used by the inbound HTTP contract.

pub mod chat;
pub mod error;

pub use chat::{ChatMessage, ChatRole};
pub use error::{Error, Result};
