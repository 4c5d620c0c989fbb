//! HTTP boundary and orchestration for the finsight assistant
//!
//! The server wires the language-model collaborator, the capability
//! registry and the market adapters into one request pipeline:
//! routing turn → optional dispatch → normalization → narration turn.

pub mod orchestrator;
pub mod persistence;
pub mod prompts;
pub mod routes;

pub use orchestrator::{ChatOutcome, Orchestrator};
pub use persistence::{FeedbackFlag, MemoryStore, StoreProvider, Stores};
pub use routes::{AppState, router};
