//! Infrastructure Database Layer
//!
//! PostgreSQL storage for credentials, patients and claims using SQLx.
//!
//! # Architecture
//!
//! Repositories hold the SQL and return row types. Adapters implement the
//! domain ports on top of them, converting rows into domain values and
//! database failures into `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimsAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let claims = PostgresClaimsAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
pub use error::DatabaseError;
pub use adapters::{PostgresClaimsAdapter, PostgresCredentialAdapter, PostgresPatientAdapter};
