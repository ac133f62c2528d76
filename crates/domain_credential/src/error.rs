//! Credential domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the credential domain
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Covers both "unknown user" and "wrong password" so callers cannot
    /// tell them apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Port(#[from] PortError),
}
