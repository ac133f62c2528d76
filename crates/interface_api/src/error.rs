//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_credential::CredentialError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    /// Unknown user and wrong password share this variant
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation { .. } | ApiError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Validation { message, details } => {
                ("validation_error", message, (!details.is_empty()).then_some(details))
            }
            ApiError::InvalidCredentials => ("invalid_credentials", "Invalid credentials".to_string(), None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::Upstream(msg) => ("upstream_error", msg, None),
            ApiError::Internal(msg) => ("internal_error", msg, None),
        };

        if status.is_server_error() {
            error!(error = error_type, message = %message, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{} {} not found", entity_type, id))
            }
            PortError::Validation { message, details } => ApiError::Validation { message, details },
            PortError::Format { message } => ApiError::BadRequest(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Upstream { service, message } => {
                ApiError::Upstream(format!("{}: {}", service, message))
            }
            PortError::Unauthorized { message } => ApiError::Upstream(message),
            other @ (PortError::Connection { .. }
            | PortError::Timeout { .. }
            | PortError::Internal { .. }) => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => ApiError::InvalidCredentials,
            CredentialError::Hashing(message) => ApiError::Internal(message),
            CredentialError::Port(port) => port.into(),
        }
    }
}
