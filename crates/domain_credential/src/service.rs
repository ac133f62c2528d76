//! Credential service
//!
//! Registration and login on top of a `CredentialPort`. Argon2 work runs on
//! the blocking thread pool so it never stalls the async executor.

use std::collections::HashSet;
use std::sync::Arc;

use argon2::Argon2;
use once_cell::sync::OnceCell;
use tracing::{info, warn};
use validator::Validate;

use core_kernel::{validation::field_errors, PortError};

use crate::credential::{CredentialView, LoginRequest, NewCredential, RegisterRequest};
use crate::error::CredentialError;
use crate::password::HashedPassword;
use crate::ports::CredentialPort;

/// Value hashed once and verified against when the username is unknown, so
/// both failure paths cost one Argon2 verification.
const DUMMY_PASSWORD: &str = "claims-desk-dummy-password";

/// Registers and authenticates users
pub struct CredentialService {
    port: Arc<dyn CredentialPort>,
    hasher: Argon2<'static>,
    dummy_hash: Arc<OnceCell<HashedPassword>>,
}

impl CredentialService {
    /// Creates a service using the default Argon2id parameters
    pub fn new(port: Arc<dyn CredentialPort>) -> Self {
        Self::with_hasher(port, Argon2::default())
    }

    /// Creates a service with explicit Argon2 parameters
    pub fn with_hasher(port: Arc<dyn CredentialPort>, hasher: Argon2<'static>) -> Self {
        Self {
            port,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Registers a single credential
    pub async fn register(&self, request: RegisterRequest) -> Result<CredentialView, CredentialError> {
        let mut created = self.register_batch(vec![request], false).await?;
        created
            .pop()
            .ok_or_else(|| CredentialError::Port(PortError::internal("insert returned no rows")))
    }

    /// Registers several credentials, all or nothing
    pub async fn register_many(
        &self,
        requests: Vec<RegisterRequest>,
    ) -> Result<Vec<CredentialView>, CredentialError> {
        self.register_batch(requests, true).await
    }

    async fn register_batch(
        &self,
        requests: Vec<RegisterRequest>,
        indexed: bool,
    ) -> Result<Vec<CredentialView>, CredentialError> {
        let mut details = Vec::new();
        let mut seen = HashSet::new();
        for (index, request) in requests.iter().enumerate() {
            let prefix = indexed.then(|| format!("[{}]", index));
            if let Err(errors) = request.validate() {
                details.extend(field_errors(prefix.as_deref(), &errors));
            }
            if !seen.insert(request.username.as_str()) {
                details.push(format!(
                    "{}: username '{}' appears more than once in the request",
                    field_path(prefix.as_deref(), "username"),
                    request.username
                ));
            }
        }

        let usernames: Vec<String> = requests.iter().map(|r| r.username.clone()).collect();
        let taken: HashSet<String> = self.port.existing_usernames(&usernames).await?.into_iter().collect();
        for (index, request) in requests.iter().enumerate() {
            if taken.contains(&request.username) {
                let prefix = indexed.then(|| format!("[{}]", index));
                details.push(format!(
                    "{}: a credential with this username already exists",
                    field_path(prefix.as_deref(), "username")
                ));
            }
        }

        if !details.is_empty() {
            return Err(PortError::validation_details("Invalid credential data", details).into());
        }

        let mut pending = Vec::with_capacity(requests.len());
        for request in requests {
            let hasher = self.hasher.clone();
            let password = request.password;
            let hashed = tokio::task::spawn_blocking(move || HashedPassword::hash_with(&hasher, &password))
                .await
                .map_err(|e| CredentialError::Hashing(e.to_string()))??;
            pending.push(NewCredential {
                username: request.username,
                password: hashed,
            });
        }

        let created = self.port.insert_many(pending).await.map_err(|e| match e {
            PortError::Conflict { message } => {
                PortError::validation_field("username", message)
            }
            other => other,
        })?;

        info!(count = created.len(), "Registered credentials");
        Ok(created.iter().map(|c| c.view()).collect())
    }

    /// Every registered credential, without password hashes
    pub async fn list(&self) -> Result<Vec<CredentialView>, CredentialError> {
        let credentials = self.port.list_credentials().await?;
        Ok(credentials.iter().map(|c| c.view()).collect())
    }

    /// Verifies a username/password pair, returning the username on success
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidCredentials` for a missing field, an
    /// unknown user and a wrong password alike.
    pub async fn login(&self, request: LoginRequest) -> Result<String, CredentialError> {
        let (Some(username), Some(password)) = (request.username, request.password) else {
            return Err(CredentialError::InvalidCredentials);
        };

        let stored = self.port.find_by_username(&username).await?;
        let known_user = stored.is_some();
        let hasher = self.hasher.clone();
        let dummy_hash = Arc::clone(&self.dummy_hash);

        let verified = tokio::task::spawn_blocking(move || match stored {
            Some(credential) => Ok(credential.password.verify(&password)),
            None => dummy_hash
                .get_or_try_init(|| HashedPassword::hash_with(&hasher, DUMMY_PASSWORD))
                .map(|dummy| {
                    let _ = dummy.verify(&password);
                    false
                }),
        })
        .await
        .map_err(|e| CredentialError::Hashing(e.to_string()))??;

        if verified {
            info!(username = %username, "Login succeeded");
            Ok(username)
        } else {
            warn!(known_user, "Login rejected");
            Err(CredentialError::InvalidCredentials)
        }
    }
}

fn field_path(prefix: Option<&str>, field: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, field),
        None => field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{Algorithm, Params, Version};

    use crate::ports::mock::MockCredentialPort;

    fn service() -> (CredentialService, MockCredentialPort) {
        let port = MockCredentialPort::new();
        let hasher = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            Params::new(1024, 1, 1, None).unwrap(),
        );
        (CredentialService::with_hasher(Arc::new(port.clone()), hasher), port)
    }

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _) = service();
        let view = service.register(register_request("alice", "secret123")).await.unwrap();
        assert_eq!(view.username, "alice");

        let username = service.login(login_request("alice", "secret123")).await.unwrap();
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let (service, _) = service();
        service.register(register_request("alice", "secret123")).await.unwrap();

        let wrong = service.login(login_request("alice", "wrong")).await.unwrap_err();
        let unknown = service.login(login_request("bob", "secret123")).await.unwrap_err();

        assert!(matches!(wrong, CredentialError::InvalidCredentials));
        assert!(matches!(unknown, CredentialError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_list_returns_views_in_id_order() {
        let (service, _) = service();
        service
            .register_many(vec![register_request("carol", "pw1"), register_request("alice", "pw2")])
            .await
            .unwrap();

        let listed = service.list().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|v| v.username.as_str()).collect();
        assert_eq!(names, vec!["carol", "alice"]);
        assert!(listed[0].userid < listed[1].userid);
    }

    #[tokio::test]
    async fn test_missing_fields_fail_generically() {
        let (service, _) = service();
        let error = service.login(LoginRequest::default()).await.unwrap_err();
        assert!(matches!(error, CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (service, port) = service();
        service.register(register_request("alice", "secret123")).await.unwrap();

        let error = service.register(register_request("alice", "other")).await.unwrap_err();
        match error {
            CredentialError::Port(PortError::Validation { details, .. }) => {
                assert!(details[0].starts_with("username:"));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert_eq!(port.len().await, 1);
    }

    #[tokio::test]
    async fn test_bulk_register_is_all_or_nothing() {
        let (service, port) = service();
        let error = service
            .register_many(vec![
                register_request("alice", "secret123"),
                register_request("", "secret123"),
            ])
            .await
            .unwrap_err();

        match error {
            CredentialError::Port(PortError::Validation { details, .. }) => {
                assert!(details.iter().any(|d| d.starts_with("[1].username")));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert!(port.is_empty().await);
    }

    #[tokio::test]
    async fn test_bulk_register_rejects_repeated_username() {
        let (service, port) = service();
        let error = service
            .register_many(vec![
                register_request("carol", "a"),
                register_request("carol", "b"),
            ])
            .await
            .unwrap_err();
        assert!(matches!(error, CredentialError::Port(PortError::Validation { .. })));
        assert!(port.is_empty().await);
    }

    #[tokio::test]
    async fn test_bulk_register_assigns_ids() {
        let (service, _) = service();
        let views = service
            .register_many(vec![register_request("dave", "a"), register_request("erin", "b")])
            .await
            .unwrap();
        assert_eq!(views.len(), 2);
        assert_ne!(views[0].userid, views[1].userid);
    }

    #[tokio::test]
    async fn test_stored_password_is_hashed() {
        let (service, port) = service();
        service.register(register_request("frank", "secret123")).await.unwrap();
        let stored = port.find_by_username("frank").await.unwrap().unwrap();
        assert_ne!(stored.password.as_str(), "secret123");
        assert!(stored.password.verify("secret123"));
    }
}
