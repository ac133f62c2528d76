//! Request/response bodies that are specific to the HTTP surface
//!
//! Domain payloads (`NewPatient`, `NewClaim`, `ClaimPatch`, ...) are
//! deserialized directly; this module holds the envelopes around them.

pub mod batch;
pub mod responses;

pub use batch::Batch;
pub use responses::{ExportResponse, ImportResponse, LoginResponse, ProbeResponse};
