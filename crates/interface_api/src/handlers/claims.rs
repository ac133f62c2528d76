//! Claims handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimPatch, ClaimStatus, ClaimWithPatient, NewClaim};

use crate::dto::Batch;
use crate::{error::ApiError, AppState};

use super::{json_body, parse_object};

/// `startdate`/`enddate` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub startdate: Option<String>,
    pub enddate: Option<String>,
}

/// Creates one claim or a list of them
pub async fn create_claims(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Batch<Claim>>), ApiError> {
    let created = match Batch::<NewClaim>::from_value(json_body(body)?)? {
        Batch::One(claim) => Batch::One(state.ledger.create(claim).await?),
        Batch::Many(claims) => Batch::Many(state.ledger.create_many(claims).await?),
    };
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_claims(State(state): State<AppState>) -> Result<Json<Vec<Claim>>, ApiError> {
    Ok(Json(state.ledger.list().await?))
}

/// Gets a claim together with its patient
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimWithPatient>, ApiError> {
    let id = claim_id(&id)?;
    Ok(Json(state.ledger.get(id).await?))
}

/// Applies a partial update; serves both PUT and PATCH
pub async fn update_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Claim>, ApiError> {
    let id = claim_id(&id)?;
    let patch: ClaimPatch = parse_object(json_body(body)?)?;
    Ok(Json(state.ledger.update(id, patch).await?))
}

pub async fn delete_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = claim_id(&id)?;
    state.ledger.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists approved claims last written inside the requested range
pub async fn approved_claims(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    let claims = state
        .ledger
        .filter_by_status_and_time(
            ClaimStatus::Approved,
            range.startdate.as_deref(),
            range.enddate.as_deref(),
        )
        .await?;
    Ok(Json(claims))
}

/// A non-numeric id cannot name a claim
fn claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Claim {} not found", raw)))
}
