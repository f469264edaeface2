//! Tolerant field decoding for the shared-stream responses.
//!
//! The service has no published schema and is inconsistent about how it
//! encodes numbers: the same field may arrive as `5` or `"5"`. These adapters
//! decode one field at a time and fall back to "absent" instead of failing the
//! whole response.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a JSON number or a numeric string.
///
/// Order: native number, then string parse, then `None`. Anything else,
/// including `null`, an empty string, or a number out of range for `T`,
/// yields `None`.
pub fn number_or_string<T>(value: &Value) -> Option<T>
where
    T: FromStr + TryFrom<u64>,
{
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| T::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            match s.parse::<T>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric value {:?}", s);
                    None
                }
            }
        }
        _ => None,
    }
}

/// `deserialize_with` shim for optional `u32` fields.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_or_string(&value))
}

/// `deserialize_with` shim for optional `u64` fields.
pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_or_string(&value))
}

/// Optional string that tolerates any other JSON type as absent.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// String defaulting to empty when absent or of the wrong type.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(deserializer).map(Option::unwrap_or_default)
}

/// Sequence whose undecodable elements are skipped with a warning.
///
/// A non-array value decodes as empty.
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!("Expected an array, got {}", type_name(&other));
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Skipping undecodable entry {}: {}", index, e);
                None
            }
        })
        .collect())
}

/// Object whose undecodable values are skipped with a warning.
pub fn skip_invalid_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            tracing::warn!("Expected an object, got {}", type_name(&other));
            return Ok(BTreeMap::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, item)| match serde_json::from_value(item) {
            Ok(v) => Some((key, v)),
            Err(e) => {
                tracing::warn!("Skipping undecodable entry {:?}: {}", key, e);
                None
            }
        })
        .collect())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
