use crate::models::Record;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;

/// Errors raised while pulling fields out of API responses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Expected a list, found {found}")]
    NotAList { found: &'static str },

    #[error("Expected an object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("District index {index} out of range ({len} districts)")]
    DistrictIndexOutOfRange { index: usize, len: usize },

    #[error("District has no field values")]
    EmptyDistrict,

    #[error("Length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// JSON type name, for error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Render a scalar the way it should appear as an identifier or ward name:
/// strings without quotes, everything else as JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pull a top-level field out of a record
pub fn extract_field<'a>(record: &'a Record, key: &str) -> Result<&'a Value, ExtractError> {
    record
        .get(key)
        .ok_or_else(|| ExtractError::KeyNotFound(key.to_string()))
}

/// Pull `key` out of every record in a JSON list, preserving order.
///
/// Fails on the first element that is not an object or lacks the key.
pub fn extract_field_across_records<'a>(
    records: &'a Value,
    key: &str,
) -> Result<Vec<&'a Value>, ExtractError> {
    let list = records.as_array().ok_or(ExtractError::NotAList {
        found: type_name(records),
    })?;

    list.iter()
        .map(|item| {
            let record = item.as_object().ok_or(ExtractError::NotAnObject {
                found: type_name(item),
            })?;
            extract_field(record, key)
        })
        .collect()
}

/// Remove duplicates. Order is not preserved.
pub fn dedupe<T, I>(items: I) -> HashSet<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    items.into_iter().collect()
}

/// Pair two parallel lists into a mapping, index by index.
///
/// Later duplicate keys overwrite earlier ones.
pub fn zip_by_index<K, V>(keys: Vec<K>, values: Vec<V>) -> Result<HashMap<K, V>, ExtractError>
where
    K: Eq + Hash,
{
    if keys.len() != values.len() {
        return Err(ExtractError::LengthMismatch {
            expected: keys.len(),
            found: values.len(),
        });
    }
    Ok(keys.into_iter().zip(values).collect())
}
