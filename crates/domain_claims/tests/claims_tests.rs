//! Claim lifecycle tests against the public domain_claims API

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use validator::Validate;

use core_kernel::{ClaimId, PatientId};
use domain_claims::{Claim, ClaimPatch, ClaimStatus, NewClaim, TimeWindow};

fn payload() -> serde_json::Value {
    json!({
        "patient_id": 4,
        "claim_status": "New",
        "disease_name": "Malaria",
        "date_of_service": "2024-06-02",
        "treatment_given": "Artemisinin course",
        "total_amount": "8200.50",
        "hospital_name": "Lakeside General",
        "hospital_address": "22 Lake Road",
        "hospital_city": "Bhopal",
        "hospital_state": "Madhya Pradesh",
        "hospital_pincode": "462001"
    })
}

// ============================================================================
// Creation
// ============================================================================

mod creation_tests {
    use super::*;

    #[test]
    fn test_payload_without_optional_fields() {
        let new: NewClaim = serde_json::from_value(payload()).unwrap();
        assert!(new.validate().is_ok());
        assert_eq!(new.patient_id, PatientId::new(4));
        assert_eq!(new.lab_test, None);
        assert!(!new.is_finalized);
        assert_eq!(new.total_amount, dec!(8200.50));
        assert_eq!(new.date_of_service, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }

    #[test]
    fn test_amount_beyond_column_precision_fails_validation() {
        let mut body = payload();
        body["total_amount"] = json!("123456789.00");
        let new: NewClaim = serde_json::from_value(body).unwrap();
        let errors = new.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("total_amount"));
    }

    #[test]
    fn test_unknown_status_label_does_not_deserialize() {
        let mut body = payload();
        body["claim_status"] = json!("Closed");
        assert!(serde_json::from_value::<NewClaim>(body).is_err());
    }

    #[test]
    fn test_stored_claim_serializes_finalized_flag_in_camel_case() {
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let new: NewClaim = serde_json::from_value(payload()).unwrap();
        let claim = Claim::from_new(ClaimId::new(12), new, at);

        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["claim_id"], 12);
        assert_eq!(json["isFinalized"], false);
        assert!(json.get("is_finalized").is_none());
    }
}

// ============================================================================
// Review workflow
// ============================================================================

mod workflow_tests {
    use super::*;

    #[test]
    fn test_review_to_approval() {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let new: NewClaim = serde_json::from_value(payload()).unwrap();
        let mut claim = Claim::from_new(ClaimId::new(1), new, created_at);

        for (step, status) in [ClaimStatus::Pending, ClaimStatus::Approved].into_iter().enumerate() {
            let patch: ClaimPatch = serde_json::from_value(json!({ "claim_status": status.as_str() })).unwrap();
            patch.check().unwrap();
            claim.apply(patch);
            claim.touch(created_at + Duration::hours(step as i64 + 1));
        }

        assert_eq!(claim.claim_status, ClaimStatus::Approved);
        assert!(claim.claim_status.is_finalized());
        assert_eq!(claim.created_timestamp, created_at);
        assert_eq!(claim.last_timestamp, created_at + Duration::hours(2));

        let june = TimeWindow::from_params(Some("2024-06-01"), Some("2024-06-30")).unwrap();
        assert!(june.contains(claim.last_timestamp));
        let may = TimeWindow::from_params(Some("2024-05-01"), Some("2024-05-31")).unwrap();
        assert!(!may.contains(claim.last_timestamp));
    }

    #[test]
    fn test_touch_with_stale_clock_still_advances() {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let new: NewClaim = serde_json::from_value(payload()).unwrap();
        let mut claim = Claim::from_new(ClaimId::new(1), new, created_at);

        claim.touch(created_at - Duration::minutes(5));
        assert!(claim.last_timestamp > created_at);
    }

    #[test]
    fn test_patch_validation_covers_supplied_fields_only() {
        let empty: ClaimPatch = serde_json::from_value(json!({})).unwrap();
        assert!(empty.check().is_ok());

        let blank: ClaimPatch = serde_json::from_value(json!({ "hospital_city": "" })).unwrap();
        let error = blank.check().unwrap_err();
        assert!(error.is_validation());
    }
}
