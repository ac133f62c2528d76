//! Response bodies

use serde::Serialize;

use domain_sync::{ExportReport, ImportSummary, ProbeReport};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
}

impl LoginResponse {
    pub fn success(username: String) -> Self {
        Self {
            message: "Login successful".to_string(),
            username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

impl From<ImportSummary> for ImportResponse {
    fn from(summary: ImportSummary) -> Self {
        Self {
            success: "Claims processed successfully".to_string(),
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: String,
    #[serde(flatten)]
    pub report: ExportReport,
}

impl From<ExportReport> for ExportResponse {
    fn from(report: ExportReport) -> Self {
        Self {
            success: "File exported and uploaded to Google Drive successfully.".to_string(),
            report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: ProbeReport,
}

impl From<ProbeReport> for ProbeResponse {
    fn from(report: ProbeReport) -> Self {
        let message = if report.exists { "File exists" } else { "File does not exist" };
        Self {
            message: message.to_string(),
            report,
        }
    }
}
