//! Google Drive Adapter
//!
//! Implements the `RemoteStore` port against the Drive v3 REST API.
//! Requests are authorized with an OAuth2 access token obtained by signing
//! a service-account JWT assertion. The token is cached and refreshed
//! shortly before it expires. Calls are made once, with no retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_drive::{DriveConfig, GoogleDriveStore};
//!
//! let store = GoogleDriveStore::new(DriveConfig::new("service_account.json"))?;
//! let files = store.find_files_by_name("claim_new.json").await?;
//! ```

pub mod config;
pub mod auth;
pub mod error;
pub mod store;

pub use config::DriveConfig;
pub use auth::{ServiceAccountKey, TokenProvider};
pub use error::DriveError;
pub use store::GoogleDriveStore;
