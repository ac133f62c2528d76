//! Request handlers, one module per area

pub mod credentials;
pub mod patients;
pub mod claims;
pub mod sync;
pub mod health;

use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Unwraps a JSON body, turning a malformed one into a 400
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Deserializes a single object, reporting serde failures as validation errors
pub(crate) fn parse_object<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Validation {
        message: "Invalid request body".to_string(),
        details: vec![e.to_string()],
    })
}
