//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for patients, claims and sync payloads. Values
//! are fixed so assertions can compare against them directly.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{ClaimId, PatientId};
use domain_claims::ClaimStatus;

/// Fixture for time-related test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard date of service (Feb 10, 2024)
    pub fn date_of_service() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
    }

    /// A fixed write time for rows built in memory
    pub fn recorded_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 11, 9, 30, 0).unwrap()
    }

    /// Range start that precedes any claim written by a test
    pub fn window_start() -> &'static str {
        "2000-01-01"
    }

    /// Range end that follows any claim written by a test
    pub fn window_end() -> &'static str {
        "2999-12-31T23:59:59Z"
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn patient_id() -> PatientId {
        PatientId::new(1)
    }

    pub fn claim_id() -> ClaimId {
        ClaimId::new(1)
    }
}

/// Fixture for amounts
pub struct AmountFixtures;

impl AmountFixtures {
    /// A typical claim amount
    pub fn claim_total() -> Decimal {
        dec!(15400.00)
    }

    /// A typical patient discount
    pub fn discount() -> Decimal {
        dec!(7.50)
    }
}

/// Fixture for sync payloads
pub struct FeedFixtures;

impl FeedFixtures {
    /// One entry of a remote claim feed, as the feed publisher writes it
    pub fn entry(claim_id: i64, patient_id: i64, status: ClaimStatus) -> Value {
        json!({
            "claim_id": claim_id,
            "patient_id": patient_id,
            "claim_status": status.as_str(),
            "disease_name": "Dengue",
            "date_of_service": "2024-02-10",
            "treatment_given": "IV fluids",
            "total_amount": "15400.00",
            "lab_test": "NS1 antigen",
            "hospital_name": "City Care",
            "hospital_address": "1 Main Road",
            "hospital_city": "Chennai",
            "hospital_state": "Tamil Nadu",
            "hospital_pincode": "600001",
            "last_timestamp": "2023-12-01T00:00:00Z",
            "created_timestamp": "2023-12-01T00:00:00Z",
            "isFinalized": false
        })
    }

    /// A feed holding the given entries, serialized for upload
    pub fn feed(entries: Vec<Value>) -> Vec<u8> {
        serde_json::to_vec(&Value::Array(entries)).unwrap()
    }
}
