//! Router wired to in-memory ports

#![allow(dead_code)]

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use axum_test::TestServer;
use tempfile::TempDir;

use core_kernel::HealthCheckable;
use domain_claims::{Claim, ClaimLedger, MockClaimsPort};
use domain_credential::{CredentialService, MockCredentialPort};
use domain_patient::{MockPatientPort, Patient, PatientRegistry};
use domain_sync::{MockRemoteStore, SyncConfig, SyncService};
use interface_api::{create_router, AppState};

pub const SHARE_EMAIL: &str = "reviewer@example.com";

pub struct TestApp {
    pub server: TestServer,
    pub claims: MockClaimsPort,
    pub patients: MockPatientPort,
    pub store: MockRemoteStore,
    pub export_dir: TempDir,
}

pub async fn app() -> TestApp {
    app_with(Vec::new(), Vec::new()).await
}

pub async fn app_with(patients: Vec<Patient>, claims: Vec<Claim>) -> TestApp {
    let credential_port = MockCredentialPort::new();
    let patient_port = MockPatientPort::with_patients(patients).await;
    let claims_port = MockClaimsPort::with_claims(claims).await;
    let store = MockRemoteStore::new();
    let export_dir = TempDir::new().unwrap();

    // Cheap parameters keep the hashing tests fast
    let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(1024, 1, 1, None).unwrap());
    let credentials = Arc::new(CredentialService::with_hasher(Arc::new(credential_port), hasher));
    let registry = Arc::new(PatientRegistry::new(Arc::new(patient_port.clone())));
    let ledger = Arc::new(ClaimLedger::new(
        Arc::new(claims_port.clone()),
        Arc::new(patient_port.clone()),
    ));
    let sync = Arc::new(SyncService::new(
        ledger.clone(),
        Arc::new(store.clone()),
        SyncConfig {
            export_dir: export_dir.path().to_path_buf(),
            share_email: Some(SHARE_EMAIL.to_string()),
            ..SyncConfig::default()
        },
    ));

    let checks: Vec<Arc<dyn HealthCheckable>> = vec![
        Arc::new(patient_port.clone()) as Arc<dyn HealthCheckable>,
        Arc::new(claims_port.clone()) as Arc<dyn HealthCheckable>,
    ];
    let state = AppState::new(credentials, registry, ledger, sync).with_health_checks(checks);

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        claims: claims_port,
        patients: patient_port,
        store,
        export_dir,
    }
}
