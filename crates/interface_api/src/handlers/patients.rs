//! Patient handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use domain_patient::{NewPatient, Patient};

use crate::dto::Batch;
use crate::{error::ApiError, AppState};

use super::json_body;

/// Creates one patient or a list of them
pub async fn create_patients(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Batch<Patient>>), ApiError> {
    let created = match Batch::<NewPatient>::from_value(json_body(body)?)? {
        Batch::One(patient) => Batch::One(state.patients.create(patient).await?),
        Batch::Many(patients) => Batch::Many(state.patients.create_many(patients).await?),
    };
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.patients.list().await?))
}
