//! Patient Registry Domain
//!
//! Patients are created independently of claims and may later be linked to
//! one. Every claim in the ledger references a patient held here.

pub mod patient;
pub mod ports;
pub mod registry;

pub use patient::{Patient, NewPatient};
pub use ports::PatientPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPatientPort;
pub use registry::PatientRegistry;
