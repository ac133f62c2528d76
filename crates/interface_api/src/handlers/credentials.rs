//! Credential handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use domain_credential::{CredentialView, LoginRequest, RegisterRequest};

use crate::dto::{Batch, LoginResponse};
use crate::{error::ApiError, AppState};

use super::json_body;

/// Registers one credential or a list of them
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Batch<CredentialView>>), ApiError> {
    let created = match Batch::<RegisterRequest>::from_value(json_body(body)?)? {
        Batch::One(request) => Batch::One(state.credentials.register(request).await?),
        Batch::Many(requests) => Batch::Many(state.credentials.register_many(requests).await?),
    };
    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists registered usernames; hashes are never returned
pub async fn list_credentials(State(state): State<AppState>) -> Result<Json<Vec<CredentialView>>, ApiError> {
    Ok(Json(state.credentials.list().await?))
}

/// Checks a username/password pair
///
/// Any unreadable body is treated like a wrong password.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let username = state.credentials.login(request).await?;
    Ok(Json(LoginResponse::success(username)))
}
