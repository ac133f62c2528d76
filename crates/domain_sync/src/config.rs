//! Sync settings

use std::path::PathBuf;

/// File names and share target used by [`crate::SyncService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Remote feed read by the importer
    pub feed_file_name: String,
    /// Name of the exported file, both locally and remotely
    pub export_file_name: String,
    /// Local directory the export is written to
    pub export_dir: PathBuf,
    /// Remote file checked by the probe
    pub spreadsheet_file_name: String,
    /// Account granted writer access to each export; sharing is skipped when unset
    pub share_email: Option<String>,
}

impl SyncConfig {
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.export_file_name)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            feed_file_name: "claim_new.json".to_string(),
            export_file_name: "claim_approved.json".to_string(),
            export_dir: PathBuf::from("."),
            spreadsheet_file_name: "claims_plan.xlsx".to_string(),
            share_email: None,
        }
    }
}
