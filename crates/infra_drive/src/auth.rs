//! Service-account authorization
//!
//! The key file is read on first use. The signed assertion is exchanged at
//! the key's `token_uri` for an access token, which is cached until it is
//! within [`REFRESH_MARGIN_SECS`] of expiring.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::DriveError;

/// Tokens this close to expiry are refreshed before use
pub const REFRESH_MARGIN_SECS: i64 = 60;

const ASSERTION_LIFETIME_SECS: i64 = 3600;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a service-account key file that signing needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Reads a key file
    ///
    /// # Errors
    ///
    /// `DriveError::ServiceAccountMissing` if the file does not exist,
    /// `DriveError::ServiceAccountInvalid` if it cannot be read or parsed
    pub async fn load(path: &Path) -> Result<Self, DriveError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DriveError::ServiceAccountMissing(path.to_path_buf()))
            }
            Err(e) => return Err(DriveError::ServiceAccountInvalid(e.to_string())),
        };
        serde_json::from_str(&raw).map_err(|e| DriveError::ServiceAccountInvalid(e.to_string()))
    }

    /// Signs an RS256 assertion for `scope`, valid for one hour from `now`
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, DriveError> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Supplies access tokens for Drive requests
pub struct TokenProvider {
    key_path: PathBuf,
    scope: String,
    client: reqwest::Client,
    key: RwLock<Option<ServiceAccountKey>>,
    token: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(key_path: PathBuf, scope: String, client: reqwest::Client) -> Self {
        Self {
            key_path,
            scope,
            client,
            key: RwLock::new(None),
            token: RwLock::new(None),
        }
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Returns a cached token or fetches a new one
    pub async fn access_token(&self) -> Result<String, DriveError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let fetched = self.fetch().await?;
        let value = fetched.value.clone();
        *slot = Some(fetched);
        Ok(value)
    }

    async fn key(&self) -> Result<ServiceAccountKey, DriveError> {
        if let Some(key) = self.key.read().await.as_ref() {
            return Ok(key.clone());
        }
        let loaded = ServiceAccountKey::load(&self.key_path).await?;
        debug!(client_email = %loaded.client_email, "Loaded service account key");
        *self.key.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn fetch(&self) -> Result<CachedToken, DriveError> {
        let key = self.key().await?;
        let now = Utc::now();
        let assertion = key.assertion(&self.scope, now)?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        info!(expires_in = token.expires_in, "Obtained Drive access token");
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
