//! Capability registry and dispatch for the finsight assistant
//!
//! A capability is a named, schema-described action the routing model may
//! request. This crate provides:
//!
//! - The `Capability` trait implemented by every handler
//! - `CapabilityRegistry`: the insertion-ordered descriptor list plus the
//!   name→handler map exposed to the model turn
//! - `Dispatcher`: resolves an invocation to its handler with the inline
//!   `{error}` policy: nothing ever propagates past this boundary
//! - Typed argument parsing helpers and JSON-schema builders

pub mod args;
pub mod capability;
pub mod dispatcher;
pub mod registry;
pub mod schema;

pub use capability::Capability;
pub use dispatcher::Dispatcher;
pub use registry::CapabilityRegistry;
