//! Remote Store Port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, HealthCheckable, PortError};

/// Metadata of a remote file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A file to create in the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mime_type: String,
    /// Parent folder ids; empty means the store root
    pub parents: Vec<String>,
    pub content: Vec<u8>,
}

/// Access grant on a remote file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "type")]
    pub grantee_type: String,
    pub role: String,
    pub email_address: String,
}

impl Permission {
    /// Writer access for a single user account
    pub fn writer(email: impl Into<String>) -> Self {
        Self {
            grantee_type: "user".to_string(),
            role: "writer".to_string(),
            email_address: email.into(),
        }
    }
}

/// Operations against a remote file-hosting service
#[async_trait]
pub trait RemoteStore: DomainPort + HealthCheckable {
    /// Files whose name matches exactly
    async fn find_files_by_name(&self, name: &str) -> Result<Vec<RemoteFile>, PortError>;

    /// Full content of a file
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, PortError>;

    /// Creates a file, returning its metadata
    async fn upload(&self, upload: Upload) -> Result<RemoteFile, PortError>;

    /// Grants access to a file
    async fn grant_permission(&self, file_id: &str, permission: Permission) -> Result<(), PortError>;
}

/// Mock implementation of RemoteStore for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Clone)]
    struct StoredFile {
        meta: RemoteFile,
        parents: Vec<String>,
        content: Vec<u8>,
    }

    /// In-memory mock implementation of RemoteStore
    #[derive(Debug, Default, Clone)]
    pub struct MockRemoteStore {
        files: Arc<RwLock<Vec<StoredFile>>>,
        grants: Arc<RwLock<Vec<(String, Permission)>>>,
        next_id: Arc<AtomicU64>,
        reject_grants: Arc<AtomicBool>,
        reject_uploads: Arc<AtomicBool>,
    }

    impl MockRemoteStore {
        /// Creates a new empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a file and returns its id
        pub async fn add_file(&self, name: &str, mime_type: &str, content: impl Into<Vec<u8>>) -> String {
            self.store_file(name, mime_type, Vec::new(), content.into()).await
        }

        async fn store_file(&self, name: &str, mime_type: &str, parents: Vec<String>, content: Vec<u8>) -> String {
            let id = format!("file-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.files.write().await.push(StoredFile {
                meta: RemoteFile {
                    id: id.clone(),
                    name: name.to_string(),
                    mime_type: Some(mime_type.to_string()),
                },
                parents,
                content,
            });
            id
        }

        /// Makes every permission grant fail
        pub fn reject_grants(&self) {
            self.reject_grants.store(true, Ordering::SeqCst);
        }

        /// Makes every upload fail
        pub fn reject_uploads(&self) {
            self.reject_uploads.store(true, Ordering::SeqCst);
        }

        /// Metadata of every stored file, uploads included
        pub async fn files(&self) -> Vec<RemoteFile> {
            self.files.read().await.iter().map(|f| f.meta.clone()).collect()
        }

        /// Content of the first file with this name
        pub async fn content_of(&self, name: &str) -> Option<Vec<u8>> {
            self.files
                .read()
                .await
                .iter()
                .find(|f| f.meta.name == name)
                .map(|f| f.content.clone())
        }

        /// Parent folders the first file with this name was uploaded into
        pub async fn parents_of(&self, name: &str) -> Option<Vec<String>> {
            self.files
                .read()
                .await
                .iter()
                .find(|f| f.meta.name == name)
                .map(|f| f.parents.clone())
        }

        /// Recorded grants as (file id, permission)
        pub async fn grants(&self) -> Vec<(String, Permission)> {
            self.grants.read().await.clone()
        }
    }

    impl DomainPort for MockRemoteStore {}

    #[async_trait]
    impl HealthCheckable for MockRemoteStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-remote-store")
        }
    }

    #[async_trait]
    impl RemoteStore for MockRemoteStore {
        async fn find_files_by_name(&self, name: &str) -> Result<Vec<RemoteFile>, PortError> {
            Ok(self
                .files
                .read()
                .await
                .iter()
                .filter(|f| f.meta.name == name)
                .map(|f| f.meta.clone())
                .collect())
        }

        async fn download(&self, file_id: &str) -> Result<Vec<u8>, PortError> {
            self.files
                .read()
                .await
                .iter()
                .find(|f| f.meta.id == file_id)
                .map(|f| f.content.clone())
                .ok_or_else(|| PortError::not_found("Remote file", file_id))
        }

        async fn upload(&self, upload: Upload) -> Result<RemoteFile, PortError> {
            if self.reject_uploads.load(Ordering::SeqCst) {
                return Err(PortError::upstream("mock-remote-store", "upload rejected"));
            }
            let id = self
                .store_file(&upload.name, &upload.mime_type, upload.parents, upload.content)
                .await;
            Ok(RemoteFile {
                id,
                name: upload.name,
                mime_type: Some(upload.mime_type),
            })
        }

        async fn grant_permission(&self, file_id: &str, permission: Permission) -> Result<(), PortError> {
            if self.reject_grants.load(Ordering::SeqCst) {
                return Err(PortError::upstream("mock-remote-store", "sharing is disabled"));
            }
            self.grants.write().await.push((file_id.to_string(), permission));
            Ok(())
        }
    }
}
