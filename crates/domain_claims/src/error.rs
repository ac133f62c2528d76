//! Claims domain errors

use thiserror::Error;

/// Errors raised while interpreting claim data
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Unknown claim status '{0}'")]
    UnknownStatus(String),
}
