//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter wraps a
//! repository, converts rows into domain values and translates
//! `DatabaseError` into `PortError`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimsAdapter;
//! use domain_claims::ClaimsPort;
//!
//! let adapter = PostgresClaimsAdapter::new(pool);
//! let claim = adapter.get_claim(claim_id).await?;
//! ```

pub mod credential;
pub mod patient;
pub mod claims;

pub use credential::PostgresCredentialAdapter;
pub use patient::PostgresPatientAdapter;
pub use claims::PostgresClaimsAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` and reports the outcome under `adapter_id`
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };
    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}
