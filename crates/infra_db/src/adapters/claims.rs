//! PostgreSQL Claims Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PatientId, PortError};
use domain_claims::{Claim, ClaimStatus, ClaimsPort, NewClaim, TimeWindow, UpsertOutcome};

use crate::error::DatabaseError;
use crate::repositories::claims::{ClaimRow, ClaimsRepository};

/// PostgreSQL-backed implementation of the ClaimsPort trait
///
/// A missing patient surfaces as a foreign key violation and is reported as
/// a `patient_id` validation error.
#[derive(Debug, Clone)]
pub struct PostgresClaimsAdapter {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresClaimsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresClaimsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClaimsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-claims-adapter").await
    }
}

#[async_trait]
impl ClaimsPort for PostgresClaimsAdapter {
    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        debug!("Fetching claim by ID");
        row_to_claim(self.repository.get_by_id(id.get()).await?)
    }

    async fn claim_exists(&self, id: ClaimId) -> Result<bool, PortError> {
        Ok(self.repository.exists(id.get()).await?)
    }

    #[instrument(skip(self, claims), fields(count = claims.len()))]
    async fn create_claims(&self, claims: Vec<NewClaim>) -> Result<Vec<Claim>, PortError> {
        let rows = self.repository.insert_many(&claims).await.map_err(write_error)?;
        rows.into_iter().map(row_to_claim).collect()
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.claim_id))]
    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        row_to_claim(self.repository.update(claim).await.map_err(write_error)?)
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn delete_claim(&self, id: ClaimId) -> Result<(), PortError> {
        Ok(self.repository.delete(id.get()).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_status_between(
        &self,
        status: ClaimStatus,
        window: TimeWindow,
    ) -> Result<Vec<Claim>, PortError> {
        let rows = self
            .repository
            .find_by_status_between(status.as_str(), window.start, window.end)
            .await?;
        rows.into_iter().map(row_to_claim).collect()
    }

    #[instrument(skip(self))]
    async fn list_claims(&self) -> Result<Vec<Claim>, PortError> {
        let rows = self.repository.list_all().await?;
        rows.into_iter().map(row_to_claim).collect()
    }

    #[instrument(skip(self, claim), fields(patient_id = %claim.patient_id))]
    async fn upsert_by_patient(
        &self,
        claim_id: Option<ClaimId>,
        claim: NewClaim,
    ) -> Result<UpsertOutcome, PortError> {
        let (row, created) = self
            .repository
            .upsert_by_patient(claim_id.map(|id| id.get()), &claim)
            .await
            .map_err(write_error)?;
        Ok(UpsertOutcome {
            claim: row_to_claim(row)?,
            created,
        })
    }
}

fn write_error(error: DatabaseError) -> PortError {
    match error {
        DatabaseError::ForeignKeyViolation(_) => {
            PortError::validation_field("patient_id", "referenced patient does not exist")
        }
        other => other.into(),
    }
}

fn row_to_claim(row: ClaimRow) -> Result<Claim, PortError> {
    let claim_status: ClaimStatus = row
        .claim_status
        .parse()
        .map_err(|e| DatabaseError::Decode(format!("claim {}: {}", row.claim_id, e)))?;
    Ok(Claim {
        claim_id: ClaimId::new(row.claim_id),
        patient_id: PatientId::new(row.patient_id),
        claim_status,
        disease_name: row.disease_name,
        date_of_service: row.date_of_service,
        treatment_given: row.treatment_given,
        total_amount: row.total_amount,
        lab_test: row.lab_test,
        hospital_name: row.hospital_name,
        hospital_address: row.hospital_address,
        hospital_city: row.hospital_city,
        hospital_state: row.hospital_state,
        hospital_pincode: row.hospital_pincode,
        last_timestamp: row.last_timestamp,
        created_timestamp: row.created_timestamp,
        is_finalized: row.is_finalized,
    })
}
