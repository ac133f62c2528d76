//! Claim records, creation payloads and partial updates

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{validation::decimal_precision, ClaimId, PatientId, PortError};
use domain_patient::Patient;

use crate::status::ClaimStatus;

/// A stored claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub patient_id: PatientId,
    pub claim_status: ClaimStatus,
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
    /// Refreshed on every write
    pub last_timestamp: DateTime<Utc>,
    /// Set once when the row is first inserted
    pub created_timestamp: DateTime<Utc>,
    #[serde(rename = "isFinalized")]
    pub is_finalized: bool,
}

impl Claim {
    /// Builds a claim from a creation payload
    pub fn from_new(claim_id: ClaimId, new: NewClaim, now: DateTime<Utc>) -> Self {
        Self {
            claim_id,
            patient_id: new.patient_id,
            claim_status: new.claim_status,
            disease_name: new.disease_name,
            date_of_service: new.date_of_service,
            treatment_given: new.treatment_given,
            total_amount: new.total_amount,
            lab_test: new.lab_test,
            hospital_name: new.hospital_name,
            hospital_address: new.hospital_address,
            hospital_city: new.hospital_city,
            hospital_state: new.hospital_state,
            hospital_pincode: new.hospital_pincode,
            last_timestamp: now,
            created_timestamp: now,
            is_finalized: new.is_finalized,
        }
    }

    /// Overwrites every payload field, keeping `created_timestamp`
    pub fn replace_with(&mut self, new: NewClaim, now: DateTime<Utc>) {
        let created = self.created_timestamp;
        let previous = self.last_timestamp;
        *self = Claim::from_new(self.claim_id, new, now);
        self.created_timestamp = created;
        self.last_timestamp = previous;
        self.touch(now);
    }

    /// Merges the supplied fields into this claim
    ///
    /// Timestamps are left alone; call [`Claim::touch`] afterwards.
    pub fn apply(&mut self, patch: ClaimPatch) {
        if let Some(patient_id) = patch.patient_id {
            self.patient_id = patient_id;
        }
        if let Some(status) = patch.claim_status {
            self.claim_status = status;
        }
        if let Some(disease_name) = patch.disease_name {
            self.disease_name = disease_name;
        }
        if let Some(date_of_service) = patch.date_of_service {
            self.date_of_service = date_of_service;
        }
        if let Some(treatment_given) = patch.treatment_given {
            self.treatment_given = treatment_given;
        }
        if let Some(total_amount) = patch.total_amount {
            self.total_amount = total_amount;
        }
        if let Some(lab_test) = patch.lab_test {
            self.lab_test = lab_test;
        }
        if let Some(hospital_name) = patch.hospital_name {
            self.hospital_name = hospital_name;
        }
        if let Some(hospital_address) = patch.hospital_address {
            self.hospital_address = hospital_address;
        }
        if let Some(hospital_city) = patch.hospital_city {
            self.hospital_city = hospital_city;
        }
        if let Some(hospital_state) = patch.hospital_state {
            self.hospital_state = hospital_state;
        }
        if let Some(hospital_pincode) = patch.hospital_pincode {
            self.hospital_pincode = hospital_pincode;
        }
        if let Some(is_finalized) = patch.is_finalized {
            self.is_finalized = is_finalized;
        }
    }

    /// Refreshes `last_timestamp`
    ///
    /// The new value is always later than the previous one, even when two
    /// writes land within the storage's microsecond resolution.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.last_timestamp + Duration::microseconds(1);
        self.last_timestamp = now.max(floor);
    }
}

/// Claim creation payload
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewClaim {
    pub patient_id: PatientId,
    pub claim_status: ClaimStatus,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub disease_name: String,
    pub date_of_service: NaiveDate,
    #[validate(length(min = 1, message = "may not be blank"))]
    pub treatment_given: String,
    #[validate(custom(function = "validate_total_amount"))]
    pub total_amount: Decimal,
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub lab_test: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub hospital_name: String,
    #[validate(length(min = 1, message = "may not be blank"))]
    pub hospital_address: String,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub hospital_city: String,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub hospital_state: String,
    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub hospital_pincode: String,
    #[serde(default, rename = "isFinalized", alias = "is_finalized")]
    pub is_finalized: bool,
}

fn validate_total_amount(value: &Decimal) -> Result<(), ValidationError> {
    decimal_precision(value, 10, 2)
}

/// Partial update payload; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct ClaimPatch {
    pub patient_id: Option<PatientId>,
    pub claim_status: Option<ClaimStatus>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub disease_name: Option<String>,
    pub date_of_service: Option<NaiveDate>,
    #[validate(length(min = 1, message = "may not be blank"))]
    pub treatment_given: Option<String>,
    #[validate(custom(function = "validate_total_amount"))]
    pub total_amount: Option<Decimal>,
    /// `Some(None)` clears the lab test; `None` leaves it alone
    #[serde(default, deserialize_with = "present_or_null")]
    pub lab_test: Option<Option<String>>,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub hospital_name: Option<String>,
    #[validate(length(min = 1, message = "may not be blank"))]
    pub hospital_address: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub hospital_city: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub hospital_state: Option<String>,
    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub hospital_pincode: Option<String>,
    #[serde(default, rename = "isFinalized", alias = "is_finalized")]
    pub is_finalized: Option<bool>,
}

impl ClaimPatch {
    /// Runs field validation, including the nullable lab test
    pub fn check(&self) -> Result<(), PortError> {
        self.validate()?;
        if let Some(Some(lab_test)) = &self.lab_test {
            if lab_test.chars().count() > 100 {
                return Err(PortError::validation_field("lab_test", "must be at most 100 characters"));
            }
        }
        Ok(())
    }
}

/// Distinguishes an explicit `null` from an absent field
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A claim joined with the patient it references
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimWithPatient {
    pub claim: Claim,
    pub patient: Patient,
}
