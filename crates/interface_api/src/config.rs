//! API configuration

use std::time::Duration;

use serde::Deserialize;

use domain_sync::SyncConfig;
use infra_db::DatabaseConfig;
use infra_drive::DriveConfig;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_PORT` or `API_DRIVE_SHARE_EMAIL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Path of the Google service-account key
    pub drive_service_account_file: String,
    /// Remote feed read by the importer
    pub drive_feed_file: String,
    /// Name of the exported file, locally and remotely
    pub drive_export_file: String,
    /// Directory the export is written to before upload
    pub drive_export_dir: String,
    /// Remote spreadsheet checked by the probe
    pub drive_spreadsheet_file: String,
    /// Account granted writer access to each export; sharing is skipped when unset
    pub drive_share_email: Option<String>,
    pub drive_api_base: String,
    pub drive_upload_base: String,
    pub drive_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let sync = SyncConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/claims".to_string(),
            database_max_connections: 10,
            database_min_connections: 2,
            log_level: "info".to_string(),
            drive_service_account_file: "service_account/service-account-file.json".to_string(),
            drive_feed_file: sync.feed_file_name,
            drive_export_file: sync.export_file_name,
            drive_export_dir: sync.export_dir.to_string_lossy().into_owned(),
            drive_spreadsheet_file: sync.spreadsheet_file_name,
            drive_share_email: None,
            drive_api_base: infra_drive::config::DEFAULT_API_BASE.to_string(),
            drive_upload_base: infra_drive::config::DEFAULT_API_BASE.to_string(),
            drive_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.database_max_connections)
            .min_connections(self.database_min_connections)
    }

    /// Settings handed to the sync service
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            feed_file_name: self.drive_feed_file.clone(),
            export_file_name: self.drive_export_file.clone(),
            export_dir: self.drive_export_dir.clone().into(),
            spreadsheet_file_name: self.drive_spreadsheet_file.clone(),
            share_email: self.drive_share_email.clone().filter(|email| !email.trim().is_empty()),
        }
    }

    /// Settings handed to the Drive adapter
    pub fn drive_config(&self) -> DriveConfig {
        DriveConfig::new(&self.drive_service_account_file)
            .api_base(&self.drive_api_base)
            .upload_base(&self.drive_upload_base)
            .timeout(Duration::from_secs(self.drive_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.drive_feed_file, "claim_new.json");
        assert_eq!(config.drive_export_file, "claim_approved.json");
        assert!(config.drive_share_email.is_none());
    }

    #[test]
    fn test_sync_config_ignores_blank_share_email() {
        let config = ApiConfig {
            drive_share_email: Some("  ".to_string()),
            ..ApiConfig::default()
        };
        assert_eq!(config.sync_config().share_email, None);

        let config = ApiConfig {
            drive_share_email: Some("reviewer@example.com".to_string()),
            drive_export_dir: "/tmp/exports".to_string(),
            ..ApiConfig::default()
        };
        let sync = config.sync_config();
        assert_eq!(sync.share_email.as_deref(), Some("reviewer@example.com"));
        assert_eq!(sync.export_path(), std::path::PathBuf::from("/tmp/exports/claim_approved.json"));
    }

    #[test]
    fn test_drive_config() {
        let config = ApiConfig {
            drive_api_base: "http://127.0.0.1:9000".to_string(),
            drive_timeout_secs: 5,
            ..ApiConfig::default()
        };
        let drive = config.drive_config();
        assert_eq!(drive.api_base, "http://127.0.0.1:9000");
        assert_eq!(drive.upload_base, infra_drive::config::DEFAULT_API_BASE);
        assert_eq!(drive.timeout, Duration::from_secs(5));
    }
}
