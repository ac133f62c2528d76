//! Drive v3 implementation of the remote store port

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_sync::{Permission, RemoteFile, RemoteStore, Upload};

use crate::auth::TokenProvider;
use crate::config::DriveConfig;
use crate::error::DriveError;

const FILE_FIELDS: &str = "id,name,mimeType";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

/// Drive v3 adapter authorized by a service account
pub struct GoogleDriveStore {
    client: Client,
    tokens: TokenProvider,
    config: DriveConfig,
}

impl GoogleDriveStore {
    /// Builds the HTTP client; the key file is not read until the first call
    pub fn new(config: DriveConfig) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortError::internal(format!("failed to build HTTP client: {}", e)))?;
        let tokens = TokenProvider::new(
            config.service_account_file.clone(),
            config.scope.clone(),
            client.clone(),
        );
        Ok(Self { client, tokens, config })
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, DriveError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            if e.is_timeout() {
                DriveError::Timeout {
                    operation: operation.to_string(),
                    duration_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                DriveError::Transport(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DriveError::Api {
            status: status.as_u16(),
            body,
        })
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.config.api_base)
    }
}

/// Quotes a value for a Drive `q` expression
fn quote_query_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Builds a `multipart/related` body holding metadata then content
fn multipart_body(boundary: &str, upload: &Upload) -> Vec<u8> {
    let mut metadata = json!({
        "name": upload.name,
        "mimeType": upload.mime_type,
    });
    if !upload.parents.is_empty() {
        metadata["parents"] = json!(upload.parents);
    }

    let mut body = Vec::with_capacity(upload.content.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", upload.mime_type).as_bytes());
    body.extend_from_slice(&upload.content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

impl DomainPort for GoogleDriveStore {}

#[async_trait]
impl HealthCheckable for GoogleDriveStore {
    /// Reports whether the service-account key is present; makes no remote call
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let present = tokio::fs::try_exists(self.tokens.key_path()).await.unwrap_or(false);
        let (status, message) = if present {
            (AdapterHealth::Healthy, None)
        } else {
            (
                AdapterHealth::Degraded,
                Some(format!("service account file {} not found", self.tokens.key_path().display())),
            )
        };
        HealthCheckResult {
            adapter_id: "google-drive-store".to_string(),
            status,
            latency_ms: start.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl RemoteStore for GoogleDriveStore {
    #[instrument(skip(self))]
    async fn find_files_by_name(&self, name: &str) -> Result<Vec<RemoteFile>, PortError> {
        let query = format!("name = {} and trashed = false", quote_query_value(name));
        let request = self.client.get(self.files_url()).query(&[
            ("q", query.as_str()),
            ("fields", "files(id,name,mimeType)"),
            ("spaces", "drive"),
        ]);
        let list: FileList = self
            .send("list files", request)
            .await?
            .json()
            .await
            .map_err(DriveError::from)?;
        debug!(matches = list.files.len(), "Listed files by name");
        Ok(list.files)
    }

    #[instrument(skip(self))]
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, PortError> {
        let request = self
            .client
            .get(format!("{}/{}", self.files_url(), file_id))
            .query(&[("alt", "media")]);
        let response = match self.send("download", request).await {
            Err(DriveError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(DriveError::FileNotFound(file_id.to_string()).into())
            }
            other => other?,
        };
        let bytes = response.bytes().await.map_err(DriveError::from)?;
        debug!(size = bytes.len(), "Downloaded file");
        Ok(bytes.to_vec())
    }

    #[instrument(skip(self, upload), fields(name = %upload.name, size = upload.content.len()))]
    async fn upload(&self, upload: Upload) -> Result<RemoteFile, PortError> {
        let boundary = format!("claims-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, &upload);
        let request = self
            .client
            .post(format!("{}/upload/drive/v3/files", self.config.upload_base))
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(CONTENT_TYPE, format!("multipart/related; boundary={}", boundary))
            .body(body);
        let file: RemoteFile = self
            .send("upload", request)
            .await?
            .json()
            .await
            .map_err(DriveError::from)?;
        debug!(file_id = %file.id, "Uploaded file");
        Ok(file)
    }

    #[instrument(skip(self, permission), fields(role = %permission.role))]
    async fn grant_permission(&self, file_id: &str, permission: Permission) -> Result<(), PortError> {
        let request = self
            .client
            .post(format!("{}/{}/permissions", self.files_url(), file_id))
            .query(&[("sendNotificationEmail", "false")])
            .json(&permission);
        self.send("share", request).await?;
        debug!("Granted permission");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn upload(parents: Vec<String>) -> Upload {
        Upload {
            name: "claim_approved.json".into(),
            mime_type: "application/json".into(),
            parents,
            content: b"[1,2]".to_vec(),
        }
    }

    #[test]
    fn test_quote_query_value_escapes_quotes() {
        assert_eq!(quote_query_value("claim_new.json"), "'claim_new.json'");
        assert_eq!(quote_query_value("o'brien\\x"), "'o\\'brien\\\\x'");
    }

    #[test]
    fn test_multipart_layout() {
        let body = String::from_utf8(multipart_body("b1", &upload(Vec::new()))).unwrap();
        assert!(body.starts_with("--b1\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n"));
        assert!(body.contains("\"name\":\"claim_approved.json\""));
        assert!(!body.contains("parents"));
        assert!(body.contains("\r\n--b1\r\nContent-Type: application/json\r\n\r\n[1,2]\r\n--b1--\r\n"));
    }

    #[test]
    fn test_multipart_includes_parents() {
        let body = String::from_utf8(multipart_body("b2", &upload(vec!["folder-1".into()]))).unwrap();
        assert!(body.contains("\"parents\":[\"folder-1\"]"));
    }

    #[tokio::test]
    async fn test_missing_service_account_is_not_found() {
        let store = GoogleDriveStore::new(
            DriveConfig::new("/definitely/not/here.json")
                .api_base("http://127.0.0.1:9")
                .timeout(Duration::from_secs(1)),
        )
        .unwrap();
        let error = store.find_files_by_name("claim_new.json").await.unwrap_err();
        assert!(error.is_not_found());

        let health = store.health_check().await;
        assert_eq!(health.status, AdapterHealth::Degraded);
    }
}
