//! Credential records and request payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CredentialId;

use crate::password::HashedPassword;

/// A stored login credential
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: CredentialId,
    pub username: String,
    pub password: HashedPassword,
}

impl Credential {
    /// Public projection without the password hash
    pub fn view(&self) -> CredentialView {
        CredentialView {
            userid: self.id,
            username: self.username.clone(),
        }
    }
}

/// A credential ready to be persisted
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password: HashedPassword,
}

/// What the API returns for a credential; the hash is write-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialView {
    pub userid: CredentialId,
    pub username: String,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub password: String,
}

/// Login payload
///
/// Fields are optional so a missing field lands in the generic
/// invalid-credentials path instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}
