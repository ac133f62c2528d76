//! External Sync Domain
//!
//! Moves claim records between the ledger and a remote file store:
//!
//! - **Import**: download a JSON claim feed and upsert each entry by patient
//! - **Export**: write approved claims in a time window to a local JSON file,
//!   upload it and optionally share it with a configured account
//! - **Probe**: check whether a named file exists remotely
//!
//! The store itself sits behind the [`RemoteStore`] port so the service can
//! be exercised without network access.

pub mod config;
pub mod ports;
pub mod service;

pub use config::SyncConfig;
pub use ports::{Permission, RemoteFile, RemoteStore, Upload};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockRemoteStore;
pub use service::{ExportReport, ImportSummary, ProbeReport, SyncService};
