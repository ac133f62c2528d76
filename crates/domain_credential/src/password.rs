//! Password hashing
//!
//! `HashedPassword` can only be built by hashing a raw password or by parsing
//! a value that is already an Argon2 PHC string, so a plaintext password
//! never reaches storage.

use std::fmt;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::CredentialError;

/// An Argon2 PHC-format password hash
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Hashes a raw password with the default Argon2id parameters
    pub fn hash(raw: &str) -> Result<Self, CredentialError> {
        Self::hash_with(&Argon2::default(), raw)
    }

    /// Hashes a raw password with the given hasher and a fresh random salt
    pub fn hash_with(hasher: &Argon2<'_>, raw: &str) -> Result<Self, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = hasher
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        Ok(Self(hash.to_string()))
    }

    /// Accepts a value that is already in hashed form
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Hashing` if the value is not an Argon2 PHC
    /// string.
    pub fn from_phc(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into();
        let parsed = PasswordHash::new(&value).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        if !parsed.algorithm.as_str().starts_with("argon2") {
            return Err(CredentialError::Hashing(format!(
                "unsupported algorithm '{}'",
                parsed.algorithm
            )));
        }
        Ok(Self(value))
    }

    /// Verifies a raw password against this hash
    ///
    /// The hash parameters are read from the PHC string; the final digest
    /// comparison is constant-time.
    pub fn verify(&self, raw: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Returns the PHC string for storage
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the hash itself.
impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}
