//! Capability trait definition

use async_trait::async_trait;
use finsight_core::Result;
use serde_json::Value;

/// Trait for capabilities the routing model can invoke
///
/// Each capability must provide a name, a description and a JSON schema for
/// its arguments. Required fields in the schema are advisory for the model;
/// `execute` must still defend against missing or malformed arguments.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Execute the capability with the model-supplied arguments
    ///
    /// Handlers return `Err` for validation and upstream failures; the
    /// dispatcher converts those into inline `{error}` objects. Batch
    /// handlers embed per-item errors in their result instead and only
    /// return `Err` when there is no meaningful partial result.
    async fn execute(&self, args: Value) -> Result<Value>;

    /// Unique capability name (e.g. "get_stock_price")
    fn name(&self) -> &str;

    /// Description shown to the routing model
    fn description(&self) -> &str;

    /// JSON schema for the capability's arguments
    fn parameters(&self) -> Value;
}
