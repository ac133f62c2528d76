//! Single-or-list request bodies

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// A body holding either one item or a list of items
///
/// Serializes back to the same shape, so a create endpoint answers an
/// object with an object and a list with a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Batch<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: DeserializeOwned> Batch<T> {
    /// Parses a JSON object or array
    ///
    /// Every failing list item is reported, prefixed with its index.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(_) => serde_json::from_value(value)
                .map(Batch::One)
                .map_err(|e| invalid_body(vec![e.to_string()])),
            Value::Array(items) => {
                let mut parsed = Vec::with_capacity(items.len());
                let mut details = Vec::new();
                for (index, item) in items.into_iter().enumerate() {
                    match serde_json::from_value(item) {
                        Ok(item) => parsed.push(item),
                        Err(e) => details.push(format!("[{}]: {}", index, e)),
                    }
                }
                if details.is_empty() {
                    Ok(Batch::Many(parsed))
                } else {
                    Err(invalid_body(details))
                }
            }
            _ => Err(ApiError::BadRequest(
                "Expected a JSON object or a list of objects".to_string(),
            )),
        }
    }
}

fn invalid_body(details: Vec<String>) -> ApiError {
    ApiError::Validation {
        message: "Invalid request body".to_string(),
        details,
    }
}
