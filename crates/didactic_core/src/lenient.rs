//! Forgiving readers for loosely typed JSON, as sent by browser forms and
//! produced by language models.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The value if it is a string, otherwise `None`.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// The string entries of an array. Anything that is not an array yields nothing.
pub fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Renders a scalar the way string interpolation would: strings as-is, `null`
/// as empty, everything else as its JSON text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like [`scalar_text`], but `null`, `false`, `0` and `""` count as absent.
pub fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(scalar_text(other)),
    }
}

/// `deserialize_with` adapter for [`scalar_text`].
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

/// `deserialize_with` adapter for [`truthy_text`]. Pair with `#[serde(default)]`.
pub fn deserialize_truthy_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(truthy_text(&Value::deserialize(deserializer)?))
}
