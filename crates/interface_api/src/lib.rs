//! HTTP API Layer
//!
//! This crate provides the REST API for the claims desk using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for credentials, patients, claims and sync
//! - **Middleware**: Request ids, tracing and audit logging
//! - **DTOs**: Single-or-list request envelopes and response bodies
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(credentials, patients, ledger, sync);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use core_kernel::HealthCheckable;
use domain_claims::ClaimLedger;
use domain_credential::CredentialService;
use domain_patient::PatientRegistry;
use domain_sync::SyncService;

use crate::middleware::audit_middleware;
use crate::handlers::{claims, credentials, health, patients, sync};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub patients: Arc<PatientRegistry>,
    pub ledger: Arc<ClaimLedger>,
    pub sync: Arc<SyncService>,
    /// Adapters consulted by `/health/ready`
    pub health_checks: Arc<Vec<Arc<dyn HealthCheckable>>>,
}

impl AppState {
    pub fn new(
        credentials: Arc<CredentialService>,
        patients: Arc<PatientRegistry>,
        ledger: Arc<ClaimLedger>,
        sync: Arc<SyncService>,
    ) -> Self {
        Self {
            credentials,
            patients,
            ledger,
            sync,
            health_checks: Arc::new(Vec::new()),
        }
    }

    pub fn with_health_checks(mut self, checks: Vec<Arc<dyn HealthCheckable>>) -> Self {
        self.health_checks = Arc::new(checks);
        self
    }
}

/// Creates the main API router
///
/// Paths keep their trailing slash, so `/claim/7` and `/claim/7/` are
/// different routes and only the latter exists.
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let credential_routes = Router::new()
        .route(
            "/logincreate/",
            get(credentials::list_credentials).post(credentials::register),
        )
        .route("/login/", post(credentials::login));

    let record_routes = Router::new()
        .route(
            "/patientcreate/",
            get(patients::list_patients).post(patients::create_patients),
        )
        .route("/claimcreate/", get(claims::list_claims).post(claims::create_claims))
        .route(
            "/claim/:id/",
            get(claims::get_claim)
                .put(claims::update_claim)
                .patch(claims::update_claim)
                .delete(claims::delete_claim),
        )
        .route("/claimapproved/", get(claims::approved_claims));

    let sync_routes = Router::new()
        .route("/googledriveview/", get(sync::import_feed))
        .route("/claimexportview/", get(sync::export_approved))
        .route("/googledriveexcelview/", get(sync::probe_spreadsheet));

    let api_routes = Router::new()
        .merge(credential_routes)
        .merge(record_routes)
        .merge(sync_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Combine all routes
    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
