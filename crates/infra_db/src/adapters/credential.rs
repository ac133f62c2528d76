//! PostgreSQL Credential Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{CredentialId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_credential::{Credential, CredentialPort, HashedPassword, NewCredential};

use crate::error::DatabaseError;
use crate::repositories::credentials::{CredentialRepository, CredentialRow};

/// PostgreSQL-backed implementation of the CredentialPort trait
#[derive(Debug, Clone)]
pub struct PostgresCredentialAdapter {
    repository: CredentialRepository,
    pool: PgPool,
}

impl PostgresCredentialAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CredentialRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresCredentialAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCredentialAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-credential-adapter").await
    }
}

#[async_trait]
impl CredentialPort for PostgresCredentialAdapter {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, PortError> {
        debug!("Fetching credential by username");
        self.repository
            .find_by_username(username)
            .await?
            .map(row_to_credential)
            .transpose()
    }

    #[instrument(skip(self), fields(count = usernames.len()))]
    async fn existing_usernames(&self, usernames: &[String]) -> Result<Vec<String>, PortError> {
        Ok(self.repository.existing_usernames(usernames).await?)
    }

    #[instrument(skip(self))]
    async fn list_credentials(&self) -> Result<Vec<Credential>, PortError> {
        self.repository
            .list_all()
            .await?
            .into_iter()
            .map(row_to_credential)
            .collect()
    }

    #[instrument(skip(self, credentials), fields(count = credentials.len()))]
    async fn insert_many(&self, credentials: Vec<NewCredential>) -> Result<Vec<Credential>, PortError> {
        let pairs: Vec<(String, String)> = credentials
            .into_iter()
            .map(|c| (c.username, c.password.as_str().to_string()))
            .collect();
        self.repository
            .insert_many(&pairs)
            .await?
            .into_iter()
            .map(row_to_credential)
            .collect()
    }
}

fn row_to_credential(row: CredentialRow) -> Result<Credential, PortError> {
    let password = HashedPassword::from_phc(row.password_hash)
        .map_err(|e| DatabaseError::Decode(format!("credential {}: {}", row.id, e)))?;
    Ok(Credential {
        id: CredentialId::new(row.id),
        username: row.username,
        password,
    })
}
