//! Remote file store handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::{ExportResponse, ImportResponse, ProbeResponse};
use crate::{error::ApiError, AppState};

use super::claims::DateRangeQuery;

/// Imports the remote claim feed
pub async fn import_feed(State(state): State<AppState>) -> Result<Json<ImportResponse>, ApiError> {
    let summary = state.sync.import_from_remote().await?;
    Ok(Json(summary.into()))
}

/// Exports approved claims in the range and uploads the file
pub async fn export_approved(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ExportResponse>, ApiError> {
    let report = state
        .sync
        .export_range(range.startdate.as_deref(), range.enddate.as_deref())
        .await?;
    Ok(Json(report.into()))
}

/// Reports whether the planning spreadsheet exists remotely
pub async fn probe_spreadsheet(State(state): State<AppState>) -> Result<Json<ProbeResponse>, ApiError> {
    let report = state.sync.probe_remote_file().await?;
    Ok(Json(report.into()))
}
