//! Claims Desk - API Server Binary
//!
//! This binary starts the HTTP API server for the claims desk.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_DRIVE_SERVICE_ACCOUNT_FILE` - Google service-account key
//! * `API_DRIVE_SHARE_EMAIL` - Account granted access to exports (optional)
//!
//! `RUST_LOG` takes precedence over `API_LOG_LEVEL` when set.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::HealthCheckable;
use domain_claims::ClaimLedger;
use domain_credential::CredentialService;
use domain_patient::PatientRegistry;
use domain_sync::SyncService;
use infra_db::{
    create_pool, run_migrations, PostgresClaimsAdapter, PostgresCredentialAdapter,
    PostgresPatientAdapter,
};
use infra_drive::GoogleDriveStore;
use interface_api::{config::ApiConfig, create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, connects to the database,
/// applies migrations, wires the services and starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Claims Desk API Server"
    );

    let pool = create_pool(config.database_config())
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool).await.context("failed to apply migrations")?;

    let credential_adapter = Arc::new(PostgresCredentialAdapter::new(pool.clone()));
    let patient_adapter = Arc::new(PostgresPatientAdapter::new(pool.clone()));
    let claims_adapter = Arc::new(PostgresClaimsAdapter::new(pool));
    let drive = Arc::new(GoogleDriveStore::new(config.drive_config())?);

    let credentials = Arc::new(CredentialService::new(credential_adapter.clone()));
    let patients = Arc::new(PatientRegistry::new(patient_adapter.clone()));
    let ledger = Arc::new(ClaimLedger::new(claims_adapter.clone(), patient_adapter.clone()));
    let sync = Arc::new(SyncService::new(ledger.clone(), drive.clone(), config.sync_config()));

    let checks: Vec<Arc<dyn HealthCheckable>> = vec![
        credential_adapter as Arc<dyn HealthCheckable>,
        patient_adapter as Arc<dyn HealthCheckable>,
        claims_adapter as Arc<dyn HealthCheckable>,
        drive as Arc<dyn HealthCheckable>,
    ];
    let state = AppState::new(credentials, patients, ledger, sync).with_health_checks(checks);

    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
