//! Drive adapter errors

use std::path::PathBuf;

use thiserror::Error;

use core_kernel::PortError;

const SERVICE: &str = "google-drive";

/// Errors that can occur while talking to Drive
#[derive(Debug, Error)]
pub enum DriveError {
    /// The service-account key file does not exist
    #[error("Service account file not found: {}", .0.display())]
    ServiceAccountMissing(PathBuf),

    /// The key file exists but cannot be used
    #[error("Invalid service account file: {0}")]
    ServiceAccountInvalid(String),

    /// The JWT assertion could not be signed
    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint refused the assertion
    #[error("Token exchange failed with status {status}: {body}")]
    TokenExchange { status: u16, body: String },

    /// A Drive call returned a non-success status
    #[error("Drive API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The requested file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The request did not complete in time
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// The request failed before a response arrived
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<DriveError> for PortError {
    fn from(error: DriveError) -> Self {
        match error {
            DriveError::ServiceAccountMissing(path) => {
                PortError::not_found("Service account file", path.display())
            }
            DriveError::FileNotFound(id) => PortError::not_found("Remote file", id),
            DriveError::Timeout { operation, duration_ms } => PortError::Timeout { operation, duration_ms },
            DriveError::TokenExchange { .. } | DriveError::Api { .. } => {
                PortError::upstream(SERVICE, error.to_string())
            }
            DriveError::Transport(e) if e.is_connect() => PortError::Connection {
                message: e.to_string(),
                source: Some(Box::new(e)),
            },
            DriveError::Transport(e) => PortError::upstream(SERVICE, e.to_string()),
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
