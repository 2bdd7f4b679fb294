//! Plain JSON configuration parsing.

use crate::core::Context;
use crate::error::ConfigError;
use serde_json::Value;

/// Parses a JSON object into a context.
///
/// # Errors
///
/// Returns [`ConfigError::ParseFailed`] if the text is not valid JSON or
/// the top-level value is not an object.
pub fn parse_json(text: &str, path: &str) -> Result<Context, ConfigError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::ParseFailed {
        path: path.to_string(),
        line: Some(e.line()).filter(|&l| l > 0),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(object) => Ok(Context::from_json_object(object)),
        other => Err(ConfigError::ParseFailed {
            path: path.to_string(),
            line: None,
            reason: format!("expected a JSON object, found {}", type_name(&other)),
        }),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
