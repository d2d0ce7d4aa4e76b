//! JSON argument parsing helpers for function and trait-based tools.
//!
//! ```rust
//! use mtooling::{parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"rust"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "rust");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn parse_arguments<T>(args_json: &str) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    optional_string(args, key)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

pub fn required_i64(args: &Map<String, Value>, key: &str) -> Result<i64, ToolError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required integer: '{key}'")))
}
