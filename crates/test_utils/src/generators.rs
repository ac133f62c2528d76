//! Test Data Generators
//!
//! Proptest strategies that respect the field limits of patients and
//! claims, plus `fake`-backed helpers for readable sample data.

use chrono::NaiveDate;
use fake::faker::address::en::{CityName, StateName, StreetName};
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::{ClaimStatus, NewClaim};
use domain_patient::NewPatient;

use crate::builders::{ClaimBuilder, PatientBuilder};

/// Strategy for generating any claim status
pub fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop::sample::select(ClaimStatus::ALL.to_vec())
}

/// Strategy for amounts with at most 10 digits and 2 decimal places
pub fn claim_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for discounts with at most 5 digits and 2 decimal places
pub fn discount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy for dates of service between 2000 and 2030
pub fn service_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2030i32, 1u32..=12u32, 1u32..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for valid claim payloads referencing `patient_id`
pub fn new_claim_strategy(patient_id: i64) -> impl Strategy<Value = NewClaim> {
    (status_strategy(), claim_amount_strategy(), "[A-Za-z ]{1,100}", "[0-9]{1,10}").prop_map(
        move |(status, amount, disease, pincode)| {
            ClaimBuilder::new()
                .for_patient(patient_id)
                .with_status(status)
                .with_amount(amount)
                .with_disease(disease)
                .with_pincode(pincode)
                .build_new()
        },
    )
}

/// A patient payload with fake name and address
pub fn fake_new_patient() -> NewPatient {
    let mut patient = PatientBuilder::new().with_name(Name().fake::<String>()).build_new();
    patient.patient_address = StreetName().fake();
    patient
}

/// A claim payload for `patient_id` with a fake hospital location
pub fn fake_new_claim(patient_id: i64) -> NewClaim {
    let city: String = CityName().fake();
    let mut claim = ClaimBuilder::new()
        .for_patient(patient_id)
        .with_hospital(format!("{} General", city), city)
        .build_new();
    claim.hospital_state = StateName().fake();
    claim
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    proptest! {
        #[test]
        fn prop_generated_claims_are_valid(claim in new_claim_strategy(1)) {
            prop_assert!(claim.validate().is_ok());
        }

        #[test]
        fn prop_generated_discounts_fit(discount in discount_strategy()) {
            let patient = NewPatient { discount_percentage: discount, ..PatientBuilder::new().build_new() };
            prop_assert!(patient.validate().is_ok());
        }
    }

    #[test]
    fn test_fake_payloads_are_valid() {
        for _ in 0..20 {
            assert!(fake_new_patient().validate().is_ok());
            assert!(fake_new_claim(3).validate().is_ok());
        }
    }
}
