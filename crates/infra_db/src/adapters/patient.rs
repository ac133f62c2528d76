//! PostgreSQL Patient Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PatientId, PortError};
use domain_patient::{NewPatient, Patient, PatientPort};

use crate::error::DatabaseError;
use crate::repositories::patients::{PatientRepository, PatientRow};

/// PostgreSQL-backed implementation of the PatientPort trait
#[derive(Debug, Clone)]
pub struct PostgresPatientAdapter {
    repository: PatientRepository,
    pool: PgPool,
}

impl PostgresPatientAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PatientRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPatientAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPatientAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-patient-adapter").await
    }
}

#[async_trait]
impl PatientPort for PostgresPatientAdapter {
    #[instrument(skip(self), fields(patient_id = %id))]
    async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError> {
        debug!("Fetching patient by ID");
        Ok(row_to_patient(self.repository.get_by_id(id.get()).await?))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_patients(&self, ids: &[PatientId]) -> Result<Vec<Patient>, PortError> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = self.repository.find_by_ids(&raw).await?;
        Ok(rows.into_iter().map(row_to_patient).collect())
    }

    #[instrument(skip(self))]
    async fn list_patients(&self) -> Result<Vec<Patient>, PortError> {
        let rows = self.repository.list_all().await?;
        Ok(rows.into_iter().map(row_to_patient).collect())
    }

    #[instrument(skip(self, patients), fields(count = patients.len()))]
    async fn create_patients(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, PortError> {
        let rows = self.repository.insert_many(&patients).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => {
                PortError::validation_field("claim_id", "referenced claim does not exist")
            }
            other => other.into(),
        })?;
        Ok(rows.into_iter().map(row_to_patient).collect())
    }
}

fn row_to_patient(row: PatientRow) -> Patient {
    Patient {
        patient_id: PatientId::new(row.patient_id),
        patient_name: row.patient_name,
        patient_address: row.patient_address,
        discount_percentage: row.discount_percentage,
        claim_id: row.claim_id.map(ClaimId::new),
        type_of_plan: row.type_of_plan,
    }
}
