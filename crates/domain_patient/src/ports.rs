//! Patient Domain Ports

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PatientId, PortError};

use crate::patient::{NewPatient, Patient};

/// Storage operations for patients
#[async_trait]
pub trait PatientPort: DomainPort + HealthCheckable {
    /// Retrieves a patient by ID
    ///
    /// # Returns
    ///
    /// The patient if found, or `PortError::NotFound`
    async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError>;

    /// Retrieves the patients that exist among `ids`
    async fn find_patients(&self, ids: &[PatientId]) -> Result<Vec<Patient>, PortError>;

    /// Every stored patient, ordered by id
    async fn list_patients(&self) -> Result<Vec<Patient>, PortError>;

    /// Persists all patients atomically, returning them with generated ids
    ///
    /// A `claim_id` that references no claim fails the batch with
    /// `PortError::Validation`.
    async fn create_patients(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, PortError>;
}

/// Mock implementation of PatientPort for testing
///
/// Claim links are stored as given; there is no claim table to check them
/// against.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of PatientPort
    #[derive(Debug, Default, Clone)]
    pub struct MockPatientPort {
        patients: Arc<RwLock<BTreeMap<PatientId, Patient>>>,
    }

    impl MockPatientPort {
        /// Creates a new empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with patients for testing
        pub async fn with_patients(patients: Vec<Patient>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.patients.write().await;
                for patient in patients {
                    stored.insert(patient.patient_id, patient);
                }
            }
            port
        }

        /// Returns how many patients are stored
        pub async fn len(&self) -> usize {
            self.patients.read().await.len()
        }

        /// Returns true when nothing is stored
        pub async fn is_empty(&self) -> bool {
            self.patients.read().await.is_empty()
        }
    }

    impl DomainPort for MockPatientPort {}

    #[async_trait]
    impl HealthCheckable for MockPatientPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-patient-port")
        }
    }

    #[async_trait]
    impl PatientPort for MockPatientPort {
        async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError> {
            self.patients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Patient", id))
        }

        async fn find_patients(&self, ids: &[PatientId]) -> Result<Vec<Patient>, PortError> {
            let stored = self.patients.read().await;
            Ok(ids.iter().filter_map(|id| stored.get(id).cloned()).collect())
        }

        async fn list_patients(&self) -> Result<Vec<Patient>, PortError> {
            Ok(self.patients.read().await.values().cloned().collect())
        }

        async fn create_patients(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, PortError> {
            let mut stored = self.patients.write().await;
            let mut next_id = stored.keys().map(|id| id.get()).max().unwrap_or(0);
            let mut created = Vec::with_capacity(patients.len());
            for new in patients {
                next_id += 1;
                let patient = new.into_patient(PatientId::new(next_id));
                stored.insert(patient.patient_id, patient.clone());
                created.push(patient);
            }
            Ok(created)
        }
    }
}
