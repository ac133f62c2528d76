//! Claims repository implementation
//!
//! Statuses are stored as their text labels and checked by the table's
//! CHECK constraint.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use domain_claims::{Claim, NewClaim};

use crate::error::DatabaseError;

macro_rules! claim_columns {
    () => {
        "claim_id, patient_id, claim_status, disease_name, date_of_service, treatment_given, \
         total_amount, lab_test, hospital_name, hospital_address, hospital_city, hospital_state, \
         hospital_pincode, last_timestamp, created_timestamp, is_finalized"
    };
}

/// Database row for the claims table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: i64,
    pub patient_id: i64,
    pub claim_status: String,
    pub disease_name: String,
    pub date_of_service: NaiveDate,
    pub treatment_given: String,
    pub total_amount: Decimal,
    pub lab_test: Option<String>,
    pub hospital_name: String,
    pub hospital_address: String,
    pub hospital_city: String,
    pub hospital_state: String,
    pub hospital_pincode: String,
    pub last_timestamp: DateTime<Utc>,
    pub created_timestamp: DateTime<Utc>,
    pub is_finalized: bool,
}

/// Repository for managing claims data
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a claim by its identifier
    pub async fn get_by_id(&self, claim_id: i64) -> Result<ClaimRow, DatabaseError> {
        sqlx::query_as::<_, ClaimRow>(concat!("SELECT ", claim_columns!(), " FROM claims WHERE claim_id = $1"))
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    pub async fn exists(&self, claim_id: i64) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM claims WHERE claim_id = $1)")
            .bind(claim_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Inserts all claims in a single transaction
    ///
    /// Both timestamps take the transaction's `now()`.
    pub async fn insert_many(&self, claims: &[NewClaim]) -> Result<Vec<ClaimRow>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(claims.len());
        for claim in claims {
            rows.push(insert(&mut tx, None, claim).await?);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// Overwrites every column of an existing claim
    pub async fn update(&self, claim: &Claim) -> Result<ClaimRow, DatabaseError> {
        sqlx::query_as::<_, ClaimRow>(concat!(
            r#"
            UPDATE claims SET
                patient_id = $2,
                claim_status = $3,
                disease_name = $4,
                date_of_service = $5,
                treatment_given = $6,
                total_amount = $7,
                lab_test = $8,
                hospital_name = $9,
                hospital_address = $10,
                hospital_city = $11,
                hospital_state = $12,
                hospital_pincode = $13,
                last_timestamp = $14,
                is_finalized = $15
            WHERE claim_id = $1
            RETURNING "#,
            claim_columns!()
        ))
        .bind(claim.claim_id.get())
        .bind(claim.patient_id.get())
        .bind(claim.claim_status.as_str())
        .bind(&claim.disease_name)
        .bind(claim.date_of_service)
        .bind(&claim.treatment_given)
        .bind(claim.total_amount)
        .bind(&claim.lab_test)
        .bind(&claim.hospital_name)
        .bind(&claim.hospital_address)
        .bind(&claim.hospital_city)
        .bind(&claim.hospital_state)
        .bind(&claim.hospital_pincode)
        .bind(claim.last_timestamp)
        .bind(claim.is_finalized)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim.claim_id))
    }

    pub async fn delete(&self, claim_id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM claims WHERE claim_id = $1")
            .bind(claim_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", claim_id));
        }
        Ok(())
    }

    /// Claims in a status whose `last_timestamp` lies in `[start, end]`
    pub async fn find_by_status_between(
        &self,
        status: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ClaimRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(concat!(
            "SELECT ",
            claim_columns!(),
            " FROM claims WHERE claim_status = $1 AND last_timestamp BETWEEN $2 AND $3 ORDER BY claim_id"
        ))
        .bind(status)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<ClaimRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(concat!("SELECT ", claim_columns!(), " FROM claims ORDER BY claim_id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rewrites the patient's lowest-numbered claim or inserts a new one
    ///
    /// Returns the stored row and whether it was inserted. An explicit id
    /// moves the claim sequence past it.
    pub async fn upsert_by_patient(
        &self,
        claim_id: Option<i64>,
        claim: &NewClaim,
    ) -> Result<(ClaimRow, bool), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT claim_id FROM claims WHERE patient_id = $1 ORDER BY claim_id LIMIT 1 FOR UPDATE",
        )
        .bind(claim.patient_id.get())
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some(current) => {
                let row = sqlx::query_as::<_, ClaimRow>(concat!(
                    r#"
                    UPDATE claims SET
                        claim_id = COALESCE($2, claim_id),
                        claim_status = $3,
                        disease_name = $4,
                        date_of_service = $5,
                        treatment_given = $6,
                        total_amount = $7,
                        lab_test = $8,
                        hospital_name = $9,
                        hospital_address = $10,
                        hospital_city = $11,
                        hospital_state = $12,
                        hospital_pincode = $13,
                        is_finalized = $14,
                        last_timestamp = GREATEST(now(), last_timestamp + interval '1 microsecond')
                    WHERE claim_id = $1
                    RETURNING "#,
                    claim_columns!()
                ))
                .bind(current)
                .bind(claim_id)
                .bind(claim.claim_status.as_str())
                .bind(&claim.disease_name)
                .bind(claim.date_of_service)
                .bind(&claim.treatment_given)
                .bind(claim.total_amount)
                .bind(&claim.lab_test)
                .bind(&claim.hospital_name)
                .bind(&claim.hospital_address)
                .bind(&claim.hospital_city)
                .bind(&claim.hospital_state)
                .bind(&claim.hospital_pincode)
                .bind(claim.is_finalized)
                .fetch_one(&mut *tx)
                .await?;
                (row, false)
            }
            None => (insert(&mut tx, claim_id, claim).await?, true),
        };

        if claim_id.is_some() {
            sqlx::query(
                "SELECT setval(pg_get_serial_sequence('claims', 'claim_id'), \
                 GREATEST((SELECT MAX(claim_id) FROM claims), 1))",
            )
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(outcome)
    }
}

async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    claim_id: Option<i64>,
    claim: &NewClaim,
) -> Result<ClaimRow, DatabaseError> {
    let row = sqlx::query_as::<_, ClaimRow>(concat!(
        r#"
        INSERT INTO claims (
            claim_id, patient_id, claim_status, disease_name, date_of_service,
            treatment_given, total_amount, lab_test, hospital_name, hospital_address,
            hospital_city, hospital_state, hospital_pincode, is_finalized
        ) VALUES (
            COALESCE($1, nextval(pg_get_serial_sequence('claims', 'claim_id'))),
            $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
        )
        RETURNING "#,
        claim_columns!()
    ))
    .bind(claim_id)
    .bind(claim.patient_id.get())
    .bind(claim.claim_status.as_str())
    .bind(&claim.disease_name)
    .bind(claim.date_of_service)
    .bind(&claim.treatment_given)
    .bind(claim.total_amount)
    .bind(&claim.lab_test)
    .bind(&claim.hospital_name)
    .bind(&claim.hospital_address)
    .bind(&claim.hospital_city)
    .bind(&claim.hospital_state)
    .bind(&claim.hospital_pincode)
    .bind(claim.is_finalized)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}
