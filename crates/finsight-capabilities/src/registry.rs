//! Registry of callable capabilities

use crate::Capability;
use finsight_llm::FunctionSpec;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry mapping capability names to handlers
///
/// Registration order is preserved: the descriptor list sent to the routing
/// model is stable across runs. Registering a capability is the only step
/// needed to make it callable; dispatch resolves through this map.
pub struct CapabilityRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    order: Vec<Arc<dyn Capability>>,
    by_name: HashMap<String, usize>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability
    ///
    /// Re-registering a name replaces the handler but keeps its original
    /// position in the descriptor order.
    pub fn register(&self, capability: Arc<dyn Capability>) {
        let mut inner = self.inner.write().unwrap();
        let name = capability.name().to_string();
        if let Some(&idx) = inner.by_name.get(&name) {
            inner.order[idx] = capability;
        } else {
            inner.order.push(capability);
            let idx = inner.order.len() - 1;
            inner.by_name.insert(name, idx);
        }
    }

    /// Get a capability by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        let inner = self.inner.read().unwrap();
        inner.by_name.get(name).map(|&idx| Arc::clone(&inner.order[idx]))
    }

    /// Descriptors for the routing model, in registration order
    pub fn definitions(&self) -> Vec<FunctionSpec> {
        let inner = self.inner.read().unwrap();
        inner
            .order
            .iter()
            .map(|c| FunctionSpec::new(c.name(), c.description(), c.parameters()))
            .collect()
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap();
        inner.order.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Dummy {
        name: &'static str,
    }

    #[async_trait]
    impl Capability for Dummy {
        async fn execute(&self, _args: Value) -> finsight_core::Result<Value> {
            Ok(json!({"from": self.name}))
        }

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "dummy"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    #[test]
    fn test_registration_order_is_stable() {
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(Dummy { name: "b" }));
        registry.register(Arc::new(Dummy { name: "a" }));
        registry.register(Arc::new(Dummy { name: "c" }));

        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_reregister_keeps_position() {
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(Dummy { name: "a" }));
        registry.register(Arc::new(Dummy { name: "b" }));
        registry.register(Arc::new(Dummy { name: "a" }));

        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_get() {
        let registry = CapabilityRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(Dummy { name: "a" }));

        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());
    }
}
