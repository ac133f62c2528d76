//! Credential Domain Ports
//!
//! `CredentialPort` is what the credential service needs from storage. The
//! PostgreSQL adapter lives in `infra_db`; an in-memory mock is available
//! behind the `mock` feature.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError};

use crate::credential::{Credential, NewCredential};

/// Storage operations for login credentials
#[async_trait]
pub trait CredentialPort: DomainPort + HealthCheckable {
    /// Looks up a credential by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, PortError>;

    /// Returns the subset of `usernames` that are already taken
    async fn existing_usernames(&self, usernames: &[String]) -> Result<Vec<String>, PortError>;

    /// Every stored credential, ordered by id
    async fn list_credentials(&self) -> Result<Vec<Credential>, PortError>;

    /// Persists all credentials atomically, returning them with their ids
    ///
    /// A username collision fails the whole batch with `PortError::Conflict`.
    async fn insert_many(&self, credentials: Vec<NewCredential>) -> Result<Vec<Credential>, PortError>;
}

/// Mock implementation of CredentialPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{CredentialId, HealthCheckResult};

    /// In-memory mock implementation of CredentialPort
    #[derive(Debug, Default, Clone)]
    pub struct MockCredentialPort {
        credentials: Arc<RwLock<BTreeMap<String, Credential>>>,
    }

    impl MockCredentialPort {
        /// Creates a new empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns how many credentials are stored
        pub async fn len(&self) -> usize {
            self.credentials.read().await.len()
        }

        /// Returns true when nothing is stored
        pub async fn is_empty(&self) -> bool {
            self.credentials.read().await.is_empty()
        }
    }

    impl DomainPort for MockCredentialPort {}

    #[async_trait]
    impl HealthCheckable for MockCredentialPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-credential-port")
        }
    }

    #[async_trait]
    impl CredentialPort for MockCredentialPort {
        async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, PortError> {
            Ok(self.credentials.read().await.get(username).cloned())
        }

        async fn existing_usernames(&self, usernames: &[String]) -> Result<Vec<String>, PortError> {
            let stored = self.credentials.read().await;
            Ok(usernames.iter().filter(|u| stored.contains_key(*u)).cloned().collect())
        }

        async fn list_credentials(&self) -> Result<Vec<Credential>, PortError> {
            let mut all: Vec<Credential> = self.credentials.read().await.values().cloned().collect();
            all.sort_by_key(|c| c.id);
            Ok(all)
        }

        async fn insert_many(&self, credentials: Vec<NewCredential>) -> Result<Vec<Credential>, PortError> {
            let mut stored = self.credentials.write().await;
            if let Some(taken) = credentials.iter().find(|c| stored.contains_key(&c.username)) {
                return Err(PortError::conflict(format!("username '{}' already exists", taken.username)));
            }

            let mut next_id = stored.values().map(|c| c.id.get()).max().unwrap_or(0);
            let mut created = Vec::with_capacity(credentials.len());
            for new in credentials {
                next_id += 1;
                let credential = Credential {
                    id: CredentialId::new(next_id),
                    username: new.username,
                    password: new.password,
                };
                stored.insert(credential.username.clone(), credential.clone());
                created.push(credential);
            }
            Ok(created)
        }
    }
}
