//! Capability dispatch with the inline error policy

use crate::CapabilityRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Error message returned for an unrecognized capability name
pub const UNSUPPORTED_FUNCTION: &str = "Function not supported";

/// Resolves capability invocations to handlers
///
/// `dispatch` never returns an error and never panics past this boundary:
/// unknown names and handler failures both become `{"error": ...}` objects
/// inline in the result, so the narration turn always has something to
/// describe.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a registry
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher resolves against
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Invoke a capability by name with raw model-supplied arguments
    pub async fn dispatch(&self, name: &str, args: Value) -> Value {
        let Some(capability) = self.registry.get(name) else {
            warn!(capability = name, "unknown capability requested");
            return json!({ "error": UNSUPPORTED_FUNCTION });
        };

        debug!(capability = name, "dispatching");

        match capability.execute(args).await {
            Ok(result) => result,
            Err(err) => {
                warn!(capability = name, error = %err, "capability failed");
                json!({ "error": err.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;
    use async_trait::async_trait;
    use finsight_core::Error;

    struct Echo;

    #[async_trait]
    impl Capability for Echo {
        async fn execute(&self, args: Value) -> finsight_core::Result<Value> {
            Ok(json!({ "echo": args }))
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes arguments"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Capability for AlwaysFails {
        async fn execute(&self, _args: Value) -> finsight_core::Result<Value> {
            Err(Error::UpstreamUnavailable("ranking feed down".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    fn dispatcher() -> Dispatcher {
        let registry = Arc::new(CapabilityRegistry::new());
        registry.register(Arc::new(Echo));
        registry.register(Arc::new(AlwaysFails));
        Dispatcher::new(registry)
    }

    #[test]
    fn test_unknown_capability() {
        let result = tokio_test::block_on(dispatcher().dispatch("nope", json!({})));
        assert_eq!(result, json!({ "error": "Function not supported" }));
    }

    #[test]
    fn test_dispatch_success() {
        let result =
            tokio_test::block_on(dispatcher().dispatch("echo", json!({"symbols": ["TCS"]})));
        assert_eq!(result["echo"]["symbols"][0], "TCS");
    }

    #[test]
    fn test_handler_error_becomes_inline_object() {
        let result = tokio_test::block_on(dispatcher().dispatch("broken", json!({})));
        let msg = result["error"].as_str().expect("error string");
        assert!(msg.contains("ranking feed down"));
    }
}
