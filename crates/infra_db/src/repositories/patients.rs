//! Patients repository implementation

use rust_decimal::Decimal;
use sqlx::PgPool;

use domain_patient::NewPatient;

use crate::error::DatabaseError;

/// Database row for the patients table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PatientRow {
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_address: String,
    pub discount_percentage: Decimal,
    pub claim_id: Option<i64>,
    pub type_of_plan: String,
}

/// Repository for patients
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, patient_id: i64) -> Result<PatientRow, DatabaseError> {
        sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT patient_id, patient_name, patient_address, discount_percentage, claim_id, type_of_plan
            FROM patients
            WHERE patient_id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Patient", patient_id))
    }

    pub async fn find_by_ids(&self, patient_ids: &[i64]) -> Result<Vec<PatientRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT patient_id, patient_name, patient_address, discount_percentage, claim_id, type_of_plan
            FROM patients
            WHERE patient_id = ANY($1)
            ORDER BY patient_id
            "#,
        )
        .bind(patient_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<PatientRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT patient_id, patient_name, patient_address, discount_percentage, claim_id, type_of_plan
            FROM patients
            ORDER BY patient_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Inserts all patients in a single transaction
    pub async fn insert_many(&self, patients: &[NewPatient]) -> Result<Vec<PatientRow>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(patients.len());
        for patient in patients {
            let row = sqlx::query_as::<_, PatientRow>(
                r#"
                INSERT INTO patients (patient_name, patient_address, discount_percentage, claim_id, type_of_plan)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING patient_id, patient_name, patient_address, discount_percentage, claim_id, type_of_plan
                "#,
            )
            .bind(&patient.patient_name)
            .bind(&patient.patient_address)
            .bind(patient.discount_percentage)
            .bind(patient.claim_id.map(|id| id.get()))
            .bind(&patient.type_of_plan)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }
}
