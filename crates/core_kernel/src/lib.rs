//! Core Kernel - Foundational types shared by the claims desk crates
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed record identifiers
//! - The port error type and marker traits for ports and adapters
//! - Conversion of field validation failures into port errors

pub mod identifiers;
pub mod ports;
pub mod validation;

pub use identifiers::{ClaimId, PatientId, CredentialId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
