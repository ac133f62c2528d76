//! Drive adapter settings

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Connection settings for [`crate::GoogleDriveStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    /// Path of the service-account JSON key, read on first use
    pub service_account_file: PathBuf,
    /// Base URL for metadata, download and permission calls
    pub api_base: String,
    /// Base URL for uploads
    pub upload_base: String,
    /// OAuth scope requested for the access token
    pub scope: String,
    /// Timeout applied to every HTTP request
    pub timeout: Duration,
}

impl DriveConfig {
    pub fn new(service_account_file: impl Into<PathBuf>) -> Self {
        Self {
            service_account_file: service_account_file.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_API_BASE.to_string(),
            scope: DRIVE_SCOPE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn upload_base(mut self, base: impl Into<String>) -> Self {
        self.upload_base = base.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
