//! Claim ledger service
//!
//! Validation and referential checks on top of a `ClaimsPort` and a
//! `PatientPort`. Every write refreshes `last_timestamp`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use validator::Validate;

use core_kernel::{validation::field_errors, ClaimId, PatientId, PortError};
use domain_patient::{Patient, PatientPort};

use crate::claim::{Claim, ClaimPatch, ClaimWithPatient, NewClaim};
use crate::ports::{ClaimsPort, UpsertOutcome};
use crate::status::ClaimStatus;
use crate::window::TimeWindow;

/// Claim operations backed by claim and patient storage
pub struct ClaimLedger {
    claims: Arc<dyn ClaimsPort>,
    patients: Arc<dyn PatientPort>,
}

impl ClaimLedger {
    pub fn new(claims: Arc<dyn ClaimsPort>, patients: Arc<dyn PatientPort>) -> Self {
        Self { claims, patients }
    }

    /// Creates one claim for an existing patient
    pub async fn create(&self, claim: NewClaim) -> Result<Claim, PortError> {
        let mut created = self.create_batch(vec![claim], false).await?;
        created
            .pop()
            .ok_or_else(|| PortError::internal("insert returned no rows"))
    }

    /// Creates several claims; nothing is stored unless every item is valid
    pub async fn create_many(&self, claims: Vec<NewClaim>) -> Result<Vec<Claim>, PortError> {
        self.create_batch(claims, true).await
    }

    async fn create_batch(&self, claims: Vec<NewClaim>, indexed: bool) -> Result<Vec<Claim>, PortError> {
        let mut details = Vec::new();
        for (index, claim) in claims.iter().enumerate() {
            if let Err(errors) = claim.validate() {
                let prefix = indexed.then(|| format!("[{}]", index));
                details.extend(field_errors(prefix.as_deref(), &errors));
            }
        }

        let ids: Vec<PatientId> = claims.iter().map(|c| c.patient_id).collect();
        let known = self.known_patients(&ids).await?;
        for (index, claim) in claims.iter().enumerate() {
            if !known.contains(&claim.patient_id) {
                let field = if indexed {
                    format!("[{}].patient_id", index)
                } else {
                    "patient_id".to_string()
                };
                details.push(format!("{}: patient {} does not exist", field, claim.patient_id));
            }
        }

        if !details.is_empty() {
            return Err(PortError::validation_details("Invalid claim data", details));
        }

        let created = self.claims.create_claims(claims).await?;
        info!(count = created.len(), "Created claims");
        Ok(created)
    }

    /// Every stored claim
    pub async fn list(&self) -> Result<Vec<Claim>, PortError> {
        self.claims.list_claims().await
    }

    /// Retrieves a claim together with its patient
    pub async fn get(&self, id: ClaimId) -> Result<ClaimWithPatient, PortError> {
        let claim = self.claims.get_claim(id).await?;
        let patient = self.patients.get_patient(claim.patient_id).await?;
        Ok(ClaimWithPatient { claim, patient })
    }

    /// Merges the supplied fields into a stored claim
    ///
    /// Finalized claims may still be updated.
    pub async fn update(&self, id: ClaimId, patch: ClaimPatch) -> Result<Claim, PortError> {
        patch.check()?;
        let mut claim = self.claims.get_claim(id).await?;

        if let Some(patient_id) = patch.patient_id {
            if patient_id != claim.patient_id && self.known_patients(&[patient_id]).await?.is_empty() {
                return Err(PortError::validation_field(
                    "patient_id",
                    format!("patient {} does not exist", patient_id),
                ));
            }
        }

        claim.apply(patch);
        claim.touch(Utc::now());
        let updated = self.claims.update_claim(&claim).await?;
        debug!(claim_id = %id, "Updated claim");
        Ok(updated)
    }

    /// Deletes a claim
    pub async fn delete(&self, id: ClaimId) -> Result<(), PortError> {
        self.claims.delete_claim(id).await?;
        info!(claim_id = %id, "Deleted claim");
        Ok(())
    }

    /// Claims with `status` whose last write falls in `[start, end]`
    ///
    /// A missing or unparsable bound yields an empty list.
    pub async fn filter_by_status_and_time(
        &self,
        status: ClaimStatus,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Claim>, PortError> {
        match TimeWindow::from_params(start, end) {
            Some(window) => self.claims.find_by_status_between(status, window).await,
            None => {
                debug!(?start, ?end, "Incomplete time window, returning no claims");
                Ok(Vec::new())
            }
        }
    }

    /// Looks up a patient; used by the importer
    pub async fn patient(&self, id: PatientId) -> Result<Patient, PortError> {
        self.patients.get_patient(id).await
    }

    pub async fn claim_exists(&self, id: ClaimId) -> Result<bool, PortError> {
        self.claims.claim_exists(id).await
    }

    /// Writes an imported claim keyed by its patient
    pub async fn upsert_imported(
        &self,
        claim_id: Option<ClaimId>,
        claim: NewClaim,
    ) -> Result<UpsertOutcome, PortError> {
        claim.validate()?;
        self.claims.upsert_by_patient(claim_id, claim).await
    }

    async fn known_patients(&self, ids: &[PatientId]) -> Result<HashSet<PatientId>, PortError> {
        let mut unique: Vec<PatientId> = ids.to_vec();
        unique.sort();
        unique.dedup();
        Ok(self
            .patients
            .find_patients(&unique)
            .await?
            .into_iter()
            .map(|p| p.patient_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use domain_patient::MockPatientPort;

    use crate::ports::mock::MockClaimsPort;

    fn patient(id: i64) -> Patient {
        Patient {
            patient_id: PatientId::new(id),
            patient_name: format!("Patient {id}"),
            patient_address: "4 Hill Street".into(),
            discount_percentage: dec!(10.00),
            claim_id: None,
            type_of_plan: "Gold".into(),
        }
    }

    fn new_claim(patient_id: i64, status: ClaimStatus) -> NewClaim {
        NewClaim {
            patient_id: PatientId::new(patient_id),
            claim_status: status,
            disease_name: "Malaria".into(),
            date_of_service: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            treatment_given: "Artemisinin".into(),
            total_amount: dec!(5200.00),
            lab_test: None,
            hospital_name: "General Hospital".into(),
            hospital_address: "12 Lake View".into(),
            hospital_city: "Pune".into(),
            hospital_state: "Maharashtra".into(),
            hospital_pincode: "411001".into(),
            is_finalized: false,
        }
    }

    async fn ledger() -> (ClaimLedger, MockClaimsPort) {
        let claims = MockClaimsPort::new();
        let patients = MockPatientPort::with_patients(vec![patient(1), patient(2)]).await;
        (ClaimLedger::new(Arc::new(claims.clone()), Arc::new(patients)), claims)
    }

    #[tokio::test]
    async fn test_create_requires_existing_patient() {
        let (ledger, claims) = ledger().await;
        let error = ledger.create(new_claim(42, ClaimStatus::New)).await.unwrap_err();
        match error {
            PortError::Validation { details, .. } => {
                assert_eq!(details, vec!["patient_id: patient 42 does not exist".to_string()]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert!(claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_many_reports_indexed_fields() {
        let (ledger, claims) = ledger().await;
        let mut invalid = new_claim(1, ClaimStatus::New);
        invalid.hospital_pincode = String::new();

        let error = ledger
            .create_many(vec![new_claim(1, ClaimStatus::New), invalid, new_claim(9, ClaimStatus::New)])
            .await
            .unwrap_err();
        match error {
            PortError::Validation { details, .. } => {
                assert!(details.iter().any(|d| d.starts_with("[1].hospital_pincode")));
                assert!(details.iter().any(|d| d.starts_with("[2].patient_id")));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert!(claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_joins_patient() {
        let (ledger, _) = ledger().await;
        let created = ledger.create(new_claim(2, ClaimStatus::Pending)).await.unwrap();
        let found = ledger.get(created.claim_id).await.unwrap();
        assert_eq!(found.claim, created);
        assert_eq!(found.patient.patient_id, PatientId::new(2));
    }

    #[tokio::test]
    async fn test_get_missing_claim() {
        let (ledger, _) = ledger().await;
        assert!(ledger.get(ClaimId::new(5)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_with_missing_patient() {
        let orphan = Claim::from_new(ClaimId::new(8), new_claim(3, ClaimStatus::New), Utc::now());
        let claims = MockClaimsPort::with_claims(vec![orphan]).await;
        let patients = MockPatientPort::with_patients(vec![patient(1)]).await;
        let ledger = ClaimLedger::new(Arc::new(claims), Arc::new(patients));

        let error = ledger.get(ClaimId::new(8)).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_list_returns_every_claim() {
        let (ledger, _) = ledger().await;
        assert!(ledger.list().await.unwrap().is_empty());

        ledger
            .create_many(vec![new_claim(1, ClaimStatus::New), new_claim(2, ClaimStatus::Approved)])
            .await
            .unwrap();
        let listed = ledger.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].claim_id < listed[1].claim_id);
    }

    #[tokio::test]
    async fn test_update_is_idempotent_and_advances_timestamp() {
        let (ledger, _) = ledger().await;
        let created = ledger.create(new_claim(1, ClaimStatus::New)).await.unwrap();
        let patch = ClaimPatch {
            claim_status: Some(ClaimStatus::Approved),
            hospital_city: Some("Mumbai".into()),
            ..Default::default()
        };

        let first = ledger.update(created.claim_id, patch.clone()).await.unwrap();
        let second = ledger.update(created.claim_id, patch).await.unwrap();

        assert_eq!(first.claim_status, ClaimStatus::Approved);
        assert_eq!(second.hospital_city, "Mumbai");
        assert!(first.last_timestamp > created.last_timestamp);
        assert!(second.last_timestamp > first.last_timestamp);
        assert_eq!(second.created_timestamp, created.created_timestamp);

        let mut normalized = second.clone();
        normalized.last_timestamp = first.last_timestamp;
        assert_eq!(normalized, first);
    }

    #[tokio::test]
    async fn test_update_finalized_claim_is_allowed() {
        let (ledger, _) = ledger().await;
        let mut finalized = new_claim(1, ClaimStatus::Approved);
        finalized.is_finalized = true;
        let created = ledger.create(finalized).await.unwrap();

        let updated = ledger
            .update(
                created.claim_id,
                ClaimPatch {
                    total_amount: Some(dec!(100.00)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_amount, dec!(100.00));
    }

    #[tokio::test]
    async fn test_update_to_unknown_patient() {
        let (ledger, _) = ledger().await;
        let created = ledger.create(new_claim(1, ClaimStatus::New)).await.unwrap();
        let error = ledger
            .update(
                created.claim_id,
                ClaimPatch {
                    patient_id: Some(PatientId::new(77)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(error.is_validation());
        assert_eq!(ledger.get(created.claim_id).await.unwrap().claim.patient_id, PatientId::new(1));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_field() {
        let (ledger, _) = ledger().await;
        let created = ledger.create(new_claim(1, ClaimStatus::New)).await.unwrap();
        let error = ledger
            .update(
                created.claim_id,
                ClaimPatch {
                    disease_name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(error.is_validation());
    }

    #[tokio::test]
    async fn test_delete() {
        let (ledger, claims) = ledger().await;
        let created = ledger.create(new_claim(1, ClaimStatus::New)).await.unwrap();
        ledger.delete(created.claim_id).await.unwrap();
        assert!(claims.is_empty().await);
        assert!(ledger.delete(created.claim_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_filter_needs_both_bounds() {
        let (ledger, _) = ledger().await;
        ledger.create(new_claim(1, ClaimStatus::Approved)).await.unwrap();

        let none = ledger
            .filter_by_status_and_time(ClaimStatus::Approved, None, Some("2999-01-01"))
            .await
            .unwrap();
        assert!(none.is_empty());

        let malformed = ledger
            .filter_by_status_and_time(ClaimStatus::Approved, Some("not-a-date"), Some("2999-01-01"))
            .await
            .unwrap();
        assert!(malformed.is_empty());

        let all = ledger
            .filter_by_status_and_time(ClaimStatus::Approved, Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_matches_status_only() {
        let (ledger, _) = ledger().await;
        ledger.create(new_claim(1, ClaimStatus::Approved)).await.unwrap();
        ledger.create(new_claim(2, ClaimStatus::Rejected)).await.unwrap();

        let rejected = ledger
            .filter_by_status_and_time(ClaimStatus::Rejected, Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].patient_id, PatientId::new(2));
    }

    #[tokio::test]
    async fn test_upsert_rewrites_patient_claim() {
        let (ledger, claims) = ledger().await;
        let created = ledger.create(new_claim(1, ClaimStatus::New)).await.unwrap();

        let outcome = ledger
            .upsert_imported(Some(ClaimId::new(500)), new_claim(1, ClaimStatus::Approved))
            .await
            .unwrap();
        assert!(!outcome.created);
        assert_eq!(outcome.claim.claim_id, ClaimId::new(500));
        assert_eq!(outcome.claim.created_timestamp, created.created_timestamp);
        assert_eq!(claims.len().await, 1);
        assert!(!ledger.claim_exists(created.claim_id).await.unwrap());

        let inserted = ledger
            .upsert_imported(None, new_claim(2, ClaimStatus::New))
            .await
            .unwrap();
        assert!(inserted.created);
        assert_eq!(claims.len().await, 2);
    }
}
