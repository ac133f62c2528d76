//! Claim Ledger Domain
//!
//! Claims are insurance reimbursement records, each tied to exactly one
//! patient. The ledger supports creation, retrieval joined with the patient,
//! partial update, deletion and filtering by status within a
//! last-modified time window.
//!
//! # Claim Status
//!
//! ```text
//! New -> Pending -> Approved | Rejected
//! ```
//!
//! Transitions are not enforced; any status may be written by an update.
//! A claim counts as finalized once it has left `New`.

pub mod claim;
pub mod status;
pub mod window;
pub mod ports;
pub mod ledger;
pub mod error;

pub use claim::{Claim, NewClaim, ClaimPatch, ClaimWithPatient};
pub use status::ClaimStatus;
pub use window::TimeWindow;
pub use ports::{ClaimsPort, UpsertOutcome};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockClaimsPort;
pub use ledger::ClaimLedger;
pub use error::ClaimError;
