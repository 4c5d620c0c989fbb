//! Typed argument parsing at the dispatch boundary
//!
//! The routing model emits an argument blob that may be malformed JSON, an
//! empty string, or a well-formed object missing required fields. Handlers
//! declare a `#[derive(Deserialize)]` params struct with serde defaults and
//! parse through `parse_args`, so validation happens once per invocation.

use finsight_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse the raw arguments blob emitted by the model
///
/// Malformed JSON is not fatal at this layer: it degrades to an empty
/// invocation and the handler's own validation decides what is required.
pub fn arguments_to_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

/// Deserialize a handler's params struct from the argument value
///
/// `null` is treated as an empty object so handlers with all-optional
/// parameters accept an empty invocation.
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = match args {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };

    serde_json::from_value(args).map_err(|e| Error::InvalidArguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Params {
        symbol: String,
        #[serde(default = "default_limit")]
        limit: u64,
    }

    fn default_limit() -> u64 {
        2
    }

    #[test]
    fn test_malformed_arguments_degrade_to_empty() {
        assert_eq!(arguments_to_value("{not json"), json!({}));
        assert_eq!(arguments_to_value(""), json!({}));
        assert_eq!(arguments_to_value(r#"{"a":1}"#), json!({"a": 1}));
    }

    #[test]
    fn test_defaults_applied() {
        let params: Params = parse_args(json!({"symbol": "TCS"})).expect("parse");
        assert_eq!(params.symbol, "TCS");
        assert_eq!(params.limit, 2);
    }

    #[test]
    fn test_missing_required_is_validation_error() {
        let result: Result<Params> = parse_args(json!({}));
        assert!(matches!(result, Err(Error::InvalidArguments(_))));
    }

    #[test]
    fn test_null_treated_as_empty() {
        #[derive(Deserialize)]
        struct NoArgs {}
        let parsed: Result<NoArgs> = parse_args(Value::Null);
        assert!(parsed.is_ok());
    }
}
