//! Helpers to build JSON schemas for capability parameters

use serde_json::{Value, json};

/// Create a JSON schema for an object with properties
///
/// # Example
///
/// ```
/// use finsight_capabilities::schema;
/// use serde_json::json;
///
/// let schema = schema::object(
///     json!({
///         "symbol": schema::string("Ticker symbol"),
///         "limit": schema::number("Maximum results"),
///     }),
///     vec!["symbol"],
/// );
/// ```
pub fn object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// String property schema
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

/// String property schema restricted to an enumerated set
pub fn enumeration(description: &str, values: &[&str]) -> Value {
    json!({
        "type": "string",
        "description": description,
        "enum": values,
    })
}

/// String property schema with a default value
pub fn string_with_default(description: &str, default: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
        "default": default,
    })
}

/// Number property schema
pub fn number(description: &str) -> Value {
    json!({
        "type": "number",
        "description": description,
    })
}

/// Integer property schema
pub fn integer(description: &str) -> Value {
    json!({
        "type": "integer",
        "description": description,
    })
}

/// Boolean property schema
pub fn boolean(description: &str) -> Value {
    json!({
        "type": "boolean",
        "description": description,
    })
}

/// Array-of-string property schema
pub fn string_array(description: &str) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": { "type": "string" },
    })
}
