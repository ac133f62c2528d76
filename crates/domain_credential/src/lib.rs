//! Credential Store Domain
//!
//! Holds username/password-hash pairs. Passwords are hashed with Argon2id on
//! registration and verified with a constant-time comparison on login.
//!
//! # Examples
//!
//! ```rust
//! use domain_credential::HashedPassword;
//!
//! let hash = HashedPassword::hash("secret123").unwrap();
//! assert!(hash.verify("secret123"));
//! assert!(!hash.verify("wrong"));
//! ```

pub mod credential;
pub mod password;
pub mod ports;
pub mod service;
pub mod error;

pub use credential::{Credential, CredentialView, NewCredential, RegisterRequest, LoginRequest};
pub use password::HashedPassword;
pub use ports::CredentialPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockCredentialPort;
pub use service::CredentialService;
pub use error::CredentialError;
