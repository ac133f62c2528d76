//! Sync service
//!
//! Import parses and validates the whole feed before writing anything, so a
//! malformed or invalid entry leaves the ledger untouched. Processing then runs in feed order and
//! stops at the first entry whose patient is unknown; earlier entries stay
//! committed.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use core_kernel::{validation::field_errors, ClaimId, PortError};
use domain_claims::{Claim, ClaimLedger, ClaimStatus, NewClaim};

use crate::config::SyncConfig;
use crate::ports::{Permission, RemoteStore, Upload};

const JSON_MIME: &str = "application/json";
const ROOT_FOLDER: &str = "root";

/// Counts reported by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub file_id: String,
    pub file_name: String,
    pub local_path: String,
    pub exported: usize,
    /// False when no share target is configured or the grant failed
    pub shared: bool,
}

/// Outcome of a remote existence check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub file_name: String,
    pub exists: bool,
    pub file_id: Option<String>,
}

struct FeedEntry {
    claim_id: Option<ClaimId>,
    claim: NewClaim,
}

/// Import, export and probe against a [`RemoteStore`]
pub struct SyncService {
    ledger: Arc<ClaimLedger>,
    store: Arc<dyn RemoteStore>,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(ledger: Arc<ClaimLedger>, store: Arc<dyn RemoteStore>, config: SyncConfig) -> Self {
        Self { ledger, store, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Imports the remote claim feed
    ///
    /// # Errors
    ///
    /// - `PortError::NotFound` if the feed is missing or empty, or an entry
    ///   names an unknown patient
    /// - `PortError::Format` if the payload is not a JSON list of claim objects
    /// - `PortError::Validation` if any entry breaks a field limit
    #[instrument(skip(self), fields(feed = %self.config.feed_file_name))]
    pub async fn import_from_remote(&self) -> Result<ImportSummary, PortError> {
        let name = &self.config.feed_file_name;
        let file = self
            .store
            .find_files_by_name(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortError::not_found("Remote file", name))?;

        let payload = self.store.download(&file.id).await?;
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Err(PortError::not_found("Remote file content", name));
        }
        let entries = parse_feed(&payload)?;
        check_feed(&entries)?;
        debug!(entries = entries.len(), "Parsed claim feed");

        let mut summary = ImportSummary::default();
        for entry in entries {
            self.ledger.patient(entry.claim.patient_id).await?;

            if let Some(id) = entry.claim_id {
                if self.ledger.claim_exists(id).await? {
                    debug!(claim_id = %id, "Claim already exists, skipping");
                    summary.skipped += 1;
                    continue;
                }
            }

            let mut claim = entry.claim;
            claim.is_finalized = claim.claim_status.is_finalized();
            let outcome = self.ledger.upsert_imported(entry.claim_id, claim).await?;
            if outcome.created {
                summary.created += 1;
            } else {
                summary.updated += 1;
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "Imported claim feed"
        );
        Ok(summary)
    }

    /// Approved claims whose last write falls in the window
    pub async fn approved_between(&self, start: Option<&str>, end: Option<&str>) -> Result<Vec<Claim>, PortError> {
        self.ledger
            .filter_by_status_and_time(ClaimStatus::Approved, start, end)
            .await
    }

    /// Writes approved claims to disk, uploads the file and shares it
    ///
    /// The local file is left in place whatever happens after it is written.
    #[instrument(skip(self))]
    pub async fn export_range(&self, start: Option<&str>, end: Option<&str>) -> Result<ExportReport, PortError> {
        let claims = self.approved_between(start, end).await?;
        if claims.is_empty() {
            return Err(PortError::not_found(
                "Approved claims",
                format!("{}..{}", start.unwrap_or(""), end.unwrap_or("")),
            ));
        }

        let content = serde_json::to_vec_pretty(&claims)
            .map_err(|e| PortError::internal(format!("failed to serialize claims: {}", e)))?;
        let path = self.config.export_path();
        tokio::fs::create_dir_all(&self.config.export_dir)
            .await
            .map_err(|e| PortError::internal(format!("failed to create {}: {}", self.config.export_dir.display(), e)))?;
        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| PortError::internal(format!("failed to write {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), count = claims.len(), "Wrote export file");

        let file = self
            .store
            .upload(Upload {
                name: self.config.export_file_name.clone(),
                mime_type: JSON_MIME.to_string(),
                parents: vec![ROOT_FOLDER.to_string()],
                content,
            })
            .await?;

        let shared = match &self.config.share_email {
            Some(email) => match self.store.grant_permission(&file.id, Permission::writer(email)).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(file_id = %file.id, error = %e, "Failed to share export");
                    false
                }
            },
            None => false,
        };

        info!(file_id = %file.id, exported = claims.len(), shared, "Exported approved claims");
        Ok(ExportReport {
            file_id: file.id,
            file_name: file.name,
            local_path: path.display().to_string(),
            exported: claims.len(),
            shared,
        })
    }

    /// Checks whether the configured spreadsheet exists remotely
    pub async fn probe_remote_file(&self) -> Result<ProbeReport, PortError> {
        let name = &self.config.spreadsheet_file_name;
        let file = self.store.find_files_by_name(name).await?.into_iter().next();
        Ok(ProbeReport {
            file_name: name.clone(),
            exists: file.is_some(),
            file_id: file.map(|f| f.id),
        })
    }
}

fn parse_feed(payload: &[u8]) -> Result<Vec<FeedEntry>, PortError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| PortError::format(format!("feed is not valid JSON: {}", e)))?;
    let Value::Array(items) = value else {
        return Err(PortError::format("feed must be a JSON list of claims"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(mut fields) = item else {
                return Err(PortError::format(format!("entry {} is not a JSON object", index)));
            };
            let claim_id = match fields.remove("claim_id") {
                None | Some(Value::Null) => None,
                Some(raw) => Some(
                    serde_json::from_value::<ClaimId>(raw)
                        .map_err(|e| PortError::format(format!("entry {}: invalid claim_id: {}", index, e)))?,
                ),
            };
            let claim = serde_json::from_value::<NewClaim>(Value::Object(fields))
                .map_err(|e| PortError::format(format!("entry {}: {}", index, e)))?;
            Ok(FeedEntry { claim_id, claim })
        })
        .collect()
}

fn check_feed(entries: &[FeedEntry]) -> Result<(), PortError> {
    let details: Vec<String> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            entry
                .claim
                .validate()
                .err()
                .map(|errors| field_errors(Some(&format!("[{}]", index)), &errors))
        })
        .flatten()
        .collect();
    if details.is_empty() {
        Ok(())
    } else {
        Err(PortError::validation_details("Invalid claim feed", details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use core_kernel::PatientId;
    use domain_claims::{ClaimsPort, MockClaimsPort};
    use domain_patient::{MockPatientPort, Patient};

    use crate::ports::mock::MockRemoteStore;

    struct Harness {
        service: SyncService,
        ledger: Arc<ClaimLedger>,
        claims: MockClaimsPort,
        store: MockRemoteStore,
        _dir: tempfile::TempDir,
    }

    fn patient(id: i64) -> Patient {
        Patient {
            patient_id: PatientId::new(id),
            patient_name: format!("Patient {id}"),
            patient_address: "9 River Lane".into(),
            discount_percentage: dec!(0.00),
            claim_id: None,
            type_of_plan: "Basic".into(),
        }
    }

    fn feed_entry(claim_id: i64, patient_id: i64, status: &str) -> Value {
        json!({
            "claim_id": claim_id,
            "patient_id": patient_id,
            "claim_status": status,
            "disease_name": "Fracture",
            "date_of_service": "2024-04-02",
            "treatment_given": "Cast",
            "total_amount": "8800.00",
            "lab_test": "X-ray",
            "hospital_name": "Ortho Clinic",
            "hospital_address": "5 Ring Road",
            "hospital_city": "Delhi",
            "hospital_state": "Delhi",
            "hospital_pincode": "110001",
            "created_timestamp": "2020-01-01T00:00:00Z",
            "isFinalized": false
        })
    }

    async fn harness(share_email: Option<&str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let claims = MockClaimsPort::new();
        let patients = MockPatientPort::with_patients(vec![patient(1), patient(2)]).await;
        let ledger = Arc::new(ClaimLedger::new(Arc::new(claims.clone()), Arc::new(patients)));
        let store = MockRemoteStore::new();
        let config = SyncConfig {
            export_dir: dir.path().join("exports"),
            share_email: share_email.map(str::to_string),
            ..SyncConfig::default()
        };
        Harness {
            service: SyncService::new(Arc::clone(&ledger), Arc::new(store.clone()), config),
            ledger,
            claims,
            store,
            _dir: dir,
        }
    }

    async fn publish_feed(store: &MockRemoteStore, value: Value) {
        store
            .add_file("claim_new.json", JSON_MIME, serde_json::to_vec(&value).unwrap())
            .await;
    }

    #[tokio::test]
    async fn test_import_creates_and_derives_finalized() {
        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Approved"), feed_entry(11, 2, "New")])).await;

        let summary = h.service.import_from_remote().await.unwrap();
        assert_eq!(summary, ImportSummary { created: 2, updated: 0, skipped: 0 });

        let approved = h.claims.get_claim(ClaimId::new(10)).await.unwrap();
        assert!(approved.is_finalized);
        assert!(approved.created_timestamp.timestamp() > 1_600_000_000);
        assert!(!h.claims.get_claim(ClaimId::new(11)).await.unwrap().is_finalized);
    }

    #[tokio::test]
    async fn test_import_skips_existing_claim_ids() {
        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "New")])).await;
        h.service.import_from_remote().await.unwrap();
        let before = h.claims.get_claim(ClaimId::new(10)).await.unwrap();

        let summary = h.service.import_from_remote().await.unwrap();

        assert_eq!(summary, ImportSummary { created: 0, updated: 0, skipped: 1 });
        assert_eq!(h.claims.get_claim(ClaimId::new(10)).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_import_rewrites_patient_claim() {
        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "New")])).await;
        h.service.import_from_remote().await.unwrap();

        let store = MockRemoteStore::new();
        publish_feed(&store, json!([feed_entry(20, 1, "Rejected")])).await;
        let service = SyncService::new(Arc::clone(&h.ledger), Arc::new(store), h.service.config().clone());

        let summary = service.import_from_remote().await.unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(h.claims.len().await, 1);
        let rewritten = h.claims.get_claim(ClaimId::new(20)).await.unwrap();
        assert_eq!(rewritten.claim_status, ClaimStatus::Rejected);
        assert!(rewritten.is_finalized);
    }

    #[tokio::test]
    async fn test_import_stops_at_unknown_patient() {
        let h = harness(None).await;
        publish_feed(
            &h.store,
            json!([feed_entry(10, 1, "New"), feed_entry(11, 99, "New"), feed_entry(12, 2, "New")]),
        )
        .await;

        let error = h.service.import_from_remote().await.unwrap_err();
        assert!(error.is_not_found());
        assert!(h.ledger.claim_exists(ClaimId::new(10)).await.unwrap());
        assert!(!h.ledger.claim_exists(ClaimId::new(12)).await.unwrap());
    }

    #[tokio::test]
    async fn test_import_format_errors_write_nothing() {
        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "New"), "oops"])).await;
        let error = h.service.import_from_remote().await.unwrap_err();
        assert!(matches!(error, PortError::Format { .. }));
        assert!(h.claims.is_empty().await);

        let h = harness(None).await;
        publish_feed(&h.store, json!({ "claim_id": 1 })).await;
        assert!(matches!(
            h.service.import_from_remote().await.unwrap_err(),
            PortError::Format { .. }
        ));

        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Archived")])).await;
        assert!(matches!(
            h.service.import_from_remote().await.unwrap_err(),
            PortError::Format { .. }
        ));
    }

    #[tokio::test]
    async fn test_import_field_limits_checked_before_any_write() {
        let h = harness(None).await;
        let mut oversized = feed_entry(11, 2, "New");
        oversized["hospital_pincode"] = json!("12345678901");
        publish_feed(&h.store, json!([feed_entry(10, 1, "New"), oversized])).await;

        match h.service.import_from_remote().await.unwrap_err() {
            PortError::Validation { details, .. } => {
                assert_eq!(details.len(), 1);
                assert!(details[0].starts_with("[1].hospital_pincode"));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert!(h.claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_import_missing_or_empty_feed() {
        let h = harness(None).await;
        assert!(h.service.import_from_remote().await.unwrap_err().is_not_found());

        h.store.add_file("claim_new.json", JSON_MIME, "").await;
        assert!(h.service.import_from_remote().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_export_without_approved_claims_writes_nothing() {
        let h = harness(Some("reviewer@example.com")).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Pending")])).await;
        h.service.import_from_remote().await.unwrap();

        let error = h
            .service
            .export_range(Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
        assert!(!h.service.config().export_path().exists());
        assert_eq!(h.store.files().await.len(), 1);
    }

    #[tokio::test]
    async fn test_export_uploads_and_shares() {
        let h = harness(Some("reviewer@example.com")).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Approved"), feed_entry(11, 2, "New")])).await;
        h.service.import_from_remote().await.unwrap();

        let report = h
            .service
            .export_range(Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap();
        assert_eq!(report.exported, 1);
        assert!(report.shared);

        let written: Vec<Claim> =
            serde_json::from_slice(&std::fs::read(h.service.config().export_path()).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].claim_id, ClaimId::new(10));

        assert_eq!(h.store.parents_of("claim_approved.json").await, Some(vec!["root".to_string()]));
        let uploaded = h.store.content_of("claim_approved.json").await.unwrap();
        let uploaded: Vec<Claim> = serde_json::from_slice(&uploaded).unwrap();
        assert_eq!(uploaded, written);

        let grants = h.store.grants().await;
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].0, report.file_id);
        assert_eq!(grants[0].1, Permission::writer("reviewer@example.com"));
    }

    #[tokio::test]
    async fn test_export_share_failure_is_reported() {
        let h = harness(Some("reviewer@example.com")).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Approved")])).await;
        h.service.import_from_remote().await.unwrap();
        h.store.reject_grants();

        let report = h
            .service
            .export_range(Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap();
        assert!(!report.shared);
    }

    #[tokio::test]
    async fn test_export_upload_failure_keeps_local_file() {
        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Approved")])).await;
        h.service.import_from_remote().await.unwrap();
        h.store.reject_uploads();

        let error = h
            .service
            .export_range(Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(error, PortError::Upstream { .. }));
        assert!(h.service.config().export_path().exists());
    }

    #[tokio::test]
    async fn test_export_without_share_target() {
        let h = harness(None).await;
        publish_feed(&h.store, json!([feed_entry(10, 1, "Approved")])).await;
        h.service.import_from_remote().await.unwrap();

        let report = h
            .service
            .export_range(Some("2000-01-01"), Some("2999-01-01"))
            .await
            .unwrap();
        assert!(!report.shared);
        assert!(h.store.grants().await.is_empty());
    }

    #[tokio::test]
    async fn test_probe() {
        let h = harness(None).await;
        let missing = h.service.probe_remote_file().await.unwrap();
        assert!(!missing.exists);
        assert_eq!(missing.file_id, None);

        let id = h
            .store
            .add_file("claims_plan.xlsx", "application/vnd.ms-excel", vec![1, 2, 3])
            .await;
        let found = h.service.probe_remote_file().await.unwrap();
        assert!(found.exists);
        assert_eq!(found.file_id, Some(id));
    }
}
