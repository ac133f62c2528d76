//! Credentials repository implementation

use sqlx::PgPool;

use crate::error::DatabaseError;

/// Database row for the credentials table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CredentialRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Repository for login credentials
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, password_hash FROM credentials WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_all(&self) -> Result<Vec<CredentialRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, password_hash FROM credentials ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Returns the given usernames that already have a credential
    pub async fn existing_usernames(&self, usernames: &[String]) -> Result<Vec<String>, DatabaseError> {
        let taken = sqlx::query_scalar::<_, String>(
            "SELECT username FROM credentials WHERE username = ANY($1) ORDER BY username",
        )
        .bind(usernames)
        .fetch_all(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Inserts `(username, password_hash)` pairs in a single transaction
    pub async fn insert_many(&self, credentials: &[(String, String)]) -> Result<Vec<CredentialRow>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(credentials.len());
        for (username, password_hash) in credentials {
            let row = sqlx::query_as::<_, CredentialRow>(
                r#"
                INSERT INTO credentials (username, password_hash)
                VALUES ($1, $2)
                RETURNING id, username, password_hash
                "#,
            )
            .bind(username)
            .bind(password_hash)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }
}
