//! Repository implementations for domain entities
//!
//! Repositories own the SQL and return row types; the adapters in
//! [`crate::adapters`] turn rows into domain values.

pub mod credentials;
pub mod patients;
pub mod claims;

pub use credentials::CredentialRepository;
pub use patients::PatientRepository;
pub use claims::ClaimsRepository;
