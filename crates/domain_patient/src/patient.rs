//! Patient records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{validation::decimal_precision, ClaimId, PatientId};

/// A stored patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: PatientId,
    pub patient_name: String,
    pub patient_address: String,
    pub discount_percentage: Decimal,
    pub claim_id: Option<ClaimId>,
    pub type_of_plan: String,
}

/// Patient creation payload
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewPatient {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub patient_name: String,
    #[validate(length(min = 1, message = "may not be blank"))]
    pub patient_address: String,
    #[validate(custom(function = "validate_discount"))]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub claim_id: Option<ClaimId>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub type_of_plan: String,
}

fn validate_discount(value: &Decimal) -> Result<(), ValidationError> {
    decimal_precision(value, 5, 2)
}

impl NewPatient {
    /// Builds the stored representation once an id has been assigned
    pub fn into_patient(self, patient_id: PatientId) -> Patient {
        Patient {
            patient_id,
            patient_name: self.patient_name,
            patient_address: self.patient_address,
            discount_percentage: self.discount_percentage,
            claim_id: self.claim_id,
            type_of_plan: self.type_of_plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid() -> NewPatient {
        NewPatient {
            patient_name: "Ravi Kumar".into(),
            patient_address: "12 Lake Road".into(),
            discount_percentage: dec!(10.00),
            claim_id: None,
            type_of_plan: "Gold".into(),
        }
    }

    #[test]
    fn test_valid_patient() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_discount_precision_enforced() {
        let mut patient = valid();
        patient.discount_percentage = dec!(1000.00);
        assert!(patient.validate().is_err());

        patient.discount_percentage = dec!(12.345);
        assert!(patient.validate().is_err());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut patient = valid();
        patient.patient_name = String::new();
        patient.type_of_plan = "x".repeat(101);
        let errors = patient.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("patient_name"));
        assert!(fields.contains_key("type_of_plan"));
    }

    #[test]
    fn test_deserialize_missing_claim_defaults_to_none() {
        let patient: NewPatient = serde_json::from_value(serde_json::json!({
            "patient_name": "Ravi Kumar",
            "patient_address": "12 Lake Road",
            "discount_percentage": "10.00",
            "type_of_plan": "Gold"
        }))
        .unwrap();
        assert_eq!(patient.claim_id, None);
        assert_eq!(patient.discount_percentage, dec!(10.00));
    }
}
