//! Claim Domain Ports

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError};

use crate::claim::{Claim, NewClaim};
use crate::status::ClaimStatus;
use crate::window::TimeWindow;

/// Result of an import upsert
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub claim: Claim,
    /// False when an existing claim of the patient was rewritten
    pub created: bool,
}

/// Storage operations for claims
///
/// Patient existence is checked by the ledger before any write reaches the
/// port; adapters backed by a relational store additionally enforce it.
#[async_trait]
pub trait ClaimsPort: DomainPort + HealthCheckable {
    /// Retrieves a claim by ID, or `PortError::NotFound`
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Returns true if a claim with this ID is stored
    async fn claim_exists(&self, id: ClaimId) -> Result<bool, PortError>;

    /// Persists all claims atomically with generated ids
    ///
    /// Both timestamps are set to the time of the write.
    async fn create_claims(&self, claims: Vec<NewClaim>) -> Result<Vec<Claim>, PortError>;

    /// Persists a modified claim as given
    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError>;

    /// Deletes a claim, or returns `PortError::NotFound`
    async fn delete_claim(&self, id: ClaimId) -> Result<(), PortError>;

    /// Claims with the given status whose `last_timestamp` falls in `window`
    async fn find_by_status_between(
        &self,
        status: ClaimStatus,
        window: TimeWindow,
    ) -> Result<Vec<Claim>, PortError>;

    /// Every stored claim, ordered by claim id
    async fn list_claims(&self) -> Result<Vec<Claim>, PortError>;

    /// Rewrites the patient's first claim in place, or inserts a new one
    ///
    /// When `claim_id` is given the stored claim takes that id.
    async fn upsert_by_patient(
        &self,
        claim_id: Option<ClaimId>,
        claim: NewClaim,
    ) -> Result<UpsertOutcome, PortError>;
}

/// Mock implementation of ClaimsPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of ClaimsPort
    #[derive(Debug, Default, Clone)]
    pub struct MockClaimsPort {
        claims: Arc<RwLock<BTreeMap<ClaimId, Claim>>>,
    }

    impl MockClaimsPort {
        /// Creates a new empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.claims.write().await;
                for claim in claims {
                    stored.insert(claim.claim_id, claim);
                }
            }
            port
        }

        /// Returns how many claims are stored
        pub async fn len(&self) -> usize {
            self.claims.read().await.len()
        }

        /// Returns true when nothing is stored
        pub async fn is_empty(&self) -> bool {
            self.claims.read().await.is_empty()
        }
    }

    fn next_id(stored: &BTreeMap<ClaimId, Claim>) -> ClaimId {
        ClaimId::new(stored.keys().map(|id| id.get()).max().unwrap_or(0) + 1)
    }

    impl DomainPort for MockClaimsPort {}

    #[async_trait]
    impl HealthCheckable for MockClaimsPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-claims-port")
        }
    }

    #[async_trait]
    impl ClaimsPort for MockClaimsPort {
        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn claim_exists(&self, id: ClaimId) -> Result<bool, PortError> {
            Ok(self.claims.read().await.contains_key(&id))
        }

        async fn create_claims(&self, claims: Vec<NewClaim>) -> Result<Vec<Claim>, PortError> {
            let mut stored = self.claims.write().await;
            let now = Utc::now();
            let mut created = Vec::with_capacity(claims.len());
            for new in claims {
                let claim = Claim::from_new(next_id(&stored), new, now);
                stored.insert(claim.claim_id, claim.clone());
                created.push(claim);
            }
            Ok(created)
        }

        async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
            let mut stored = self.claims.write().await;
            match stored.get_mut(&claim.claim_id) {
                Some(existing) => {
                    *existing = claim.clone();
                    Ok(claim.clone())
                }
                None => Err(PortError::not_found("Claim", claim.claim_id)),
            }
        }

        async fn delete_claim(&self, id: ClaimId) -> Result<(), PortError> {
            self.claims
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn find_by_status_between(
            &self,
            status: ClaimStatus,
            window: TimeWindow,
        ) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .claims
                .read()
                .await
                .values()
                .filter(|c| c.claim_status == status && window.contains(c.last_timestamp))
                .cloned()
                .collect())
        }

        async fn list_claims(&self) -> Result<Vec<Claim>, PortError> {
            Ok(self.claims.read().await.values().cloned().collect())
        }

        async fn upsert_by_patient(
            &self,
            claim_id: Option<ClaimId>,
            claim: NewClaim,
        ) -> Result<UpsertOutcome, PortError> {
            let mut stored = self.claims.write().await;
            let now = Utc::now();
            let existing = stored
                .values()
                .find(|c| c.patient_id == claim.patient_id)
                .map(|c| c.claim_id);

            if let Some(target) = claim_id {
                if existing != Some(target) && stored.contains_key(&target) {
                    return Err(PortError::conflict(format!("claim {} already exists", target)));
                }
            }

            let outcome = match existing.and_then(|id| stored.remove(&id)) {
                Some(mut current) => {
                    current.replace_with(claim, now);
                    if let Some(target) = claim_id {
                        current.claim_id = target;
                    }
                    UpsertOutcome { claim: current, created: false }
                }
                None => {
                    let id = claim_id.unwrap_or_else(|| next_id(&stored));
                    UpsertOutcome {
                        claim: Claim::from_new(id, claim, now),
                        created: true,
                    }
                }
            };
            stored.insert(outcome.claim.claim_id, outcome.claim.clone());
            Ok(outcome)
        }
    }
}
