//! Patient registry service

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use core_kernel::{validation::field_errors, PortError};

use crate::patient::{NewPatient, Patient};
use crate::ports::PatientPort;

/// Validates and stores patients
pub struct PatientRegistry {
    port: Arc<dyn PatientPort>,
}

impl PatientRegistry {
    pub fn new(port: Arc<dyn PatientPort>) -> Self {
        Self { port }
    }

    /// Creates one patient
    pub async fn create(&self, patient: NewPatient) -> Result<Patient, PortError> {
        patient.validate()?;
        let mut created = self.port.create_patients(vec![patient]).await?;
        created
            .pop()
            .ok_or_else(|| PortError::internal("insert returned no rows"))
    }

    /// Creates several patients; nothing is stored unless every item is valid
    pub async fn create_many(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, PortError> {
        let details: Vec<String> = patients
            .iter()
            .enumerate()
            .filter_map(|(index, patient)| {
                patient
                    .validate()
                    .err()
                    .map(|errors| field_errors(Some(&format!("[{}]", index)), &errors))
            })
            .flatten()
            .collect();
        if !details.is_empty() {
            return Err(PortError::validation_details("Invalid patient data", details));
        }

        let created = self.port.create_patients(patients).await?;
        info!(count = created.len(), "Created patients");
        Ok(created)
    }

    /// Every stored patient
    pub async fn list(&self) -> Result<Vec<Patient>, PortError> {
        self.port.list_patients().await
    }
}
