//! Test Data Builders
//!
//! Builders with valid defaults so tests only spell out the fields they
//! care about.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use core_kernel::{ClaimId, PatientId};
use domain_claims::{Claim, ClaimStatus, NewClaim};
use domain_patient::{NewPatient, Patient};

use crate::fixtures::{AmountFixtures, IdFixtures, TemporalFixtures};

/// Builder for patient payloads and stored patients
#[derive(Debug, Clone)]
pub struct PatientBuilder {
    patient_id: PatientId,
    patient_name: String,
    patient_address: String,
    discount_percentage: Decimal,
    claim_id: Option<ClaimId>,
    type_of_plan: String,
}

impl Default for PatientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientBuilder {
    pub fn new() -> Self {
        Self {
            patient_id: IdFixtures::patient_id(),
            patient_name: "Asha Menon".to_string(),
            patient_address: "4 Hill Street".to_string(),
            discount_percentage: AmountFixtures::discount(),
            claim_id: None,
            type_of_plan: "Silver".to_string(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.patient_id = PatientId::new(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = name.into();
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount_percentage = discount;
        self
    }

    pub fn with_claim(mut self, claim_id: ClaimId) -> Self {
        self.claim_id = Some(claim_id);
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.type_of_plan = plan.into();
        self
    }

    /// Builds a creation payload; the id is ignored
    pub fn build_new(self) -> NewPatient {
        NewPatient {
            patient_name: self.patient_name,
            patient_address: self.patient_address,
            discount_percentage: self.discount_percentage,
            claim_id: self.claim_id,
            type_of_plan: self.type_of_plan,
        }
    }

    /// Builds a stored patient
    pub fn build(self) -> Patient {
        let id = self.patient_id;
        self.build_new().into_patient(id)
    }

    /// Builds the JSON body accepted by the patient endpoint
    pub fn build_json(self) -> Value {
        json!({
            "patient_name": self.patient_name,
            "patient_address": self.patient_address,
            "discount_percentage": self.discount_percentage.to_string(),
            "claim_id": self.claim_id.map(|id| id.get()),
            "type_of_plan": self.type_of_plan,
        })
    }
}

/// Builder for claim payloads and stored claims
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    claim_id: ClaimId,
    patient_id: PatientId,
    claim_status: ClaimStatus,
    disease_name: String,
    date_of_service: NaiveDate,
    treatment_given: String,
    total_amount: Decimal,
    lab_test: Option<String>,
    hospital_name: String,
    hospital_city: String,
    hospital_pincode: String,
    recorded_at: DateTime<Utc>,
    is_finalized: bool,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    pub fn new() -> Self {
        Self {
            claim_id: IdFixtures::claim_id(),
            patient_id: IdFixtures::patient_id(),
            claim_status: ClaimStatus::New,
            disease_name: "Dengue".to_string(),
            date_of_service: TemporalFixtures::date_of_service(),
            treatment_given: "IV fluids".to_string(),
            total_amount: AmountFixtures::claim_total(),
            lab_test: Some("NS1 antigen".to_string()),
            hospital_name: "City Care".to_string(),
            hospital_city: "Chennai".to_string(),
            hospital_pincode: "600001".to_string(),
            recorded_at: TemporalFixtures::recorded_at(),
            is_finalized: false,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.claim_id = ClaimId::new(id);
        self
    }

    pub fn for_patient(mut self, id: i64) -> Self {
        self.patient_id = PatientId::new(id);
        self
    }

    /// Sets the status and the matching finalized flag
    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.claim_status = status;
        self.is_finalized = status.is_finalized();
        self
    }

    pub fn with_disease(mut self, disease: impl Into<String>) -> Self {
        self.disease_name = disease.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.total_amount = amount;
        self
    }

    pub fn with_lab_test(mut self, lab_test: Option<&str>) -> Self {
        self.lab_test = lab_test.map(str::to_string);
        self
    }

    pub fn with_hospital(mut self, name: impl Into<String>, city: impl Into<String>) -> Self {
        self.hospital_name = name.into();
        self.hospital_city = city.into();
        self
    }

    pub fn with_pincode(mut self, pincode: impl Into<String>) -> Self {
        self.hospital_pincode = pincode.into();
        self
    }

    /// Sets both timestamps of a stored claim
    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = at;
        self
    }

    /// Builds a creation payload; the id and timestamps are ignored
    pub fn build_new(self) -> NewClaim {
        NewClaim {
            patient_id: self.patient_id,
            claim_status: self.claim_status,
            disease_name: self.disease_name,
            date_of_service: self.date_of_service,
            treatment_given: self.treatment_given,
            total_amount: self.total_amount,
            lab_test: self.lab_test,
            hospital_name: self.hospital_name,
            hospital_address: "1 Main Road".to_string(),
            hospital_city: self.hospital_city,
            hospital_state: "Tamil Nadu".to_string(),
            hospital_pincode: self.hospital_pincode,
            is_finalized: self.is_finalized,
        }
    }

    /// Builds a stored claim
    pub fn build(self) -> Claim {
        let (id, at) = (self.claim_id, self.recorded_at);
        Claim::from_new(id, self.build_new(), at)
    }

    /// Builds the JSON body accepted by the claim endpoint
    pub fn build_json(self) -> Value {
        json!({
            "patient_id": self.patient_id.get(),
            "claim_status": self.claim_status.as_str(),
            "disease_name": self.disease_name,
            "date_of_service": self.date_of_service.to_string(),
            "treatment_given": self.treatment_given,
            "total_amount": self.total_amount.to_string(),
            "lab_test": self.lab_test,
            "hospital_name": self.hospital_name,
            "hospital_address": "1 Main Road",
            "hospital_city": self.hospital_city,
            "hospital_state": "Tamil Nadu",
            "hospital_pincode": self.hospital_pincode,
            "isFinalized": self.is_finalized,
        })
    }
}
