//! Custom Test Assertions
//!
//! Assertion helpers for `PortError` that print the full error on failure.

use core_kernel::PortError;

/// Asserts a validation error with a detail line starting with `prefix`
///
/// # Panics
///
/// Panics if the error is not a validation error or no detail matches
pub fn assert_validation_detail(error: &PortError, prefix: &str) {
    match error {
        PortError::Validation { details, .. } => assert!(
            details.iter().any(|d| d.starts_with(prefix)),
            "No validation detail starts with '{}': {:?}",
            prefix,
            details
        ),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

/// Asserts a not-found error
pub fn assert_not_found(error: &PortError) {
    assert!(error.is_not_found(), "Expected not found error, got {:?}", error);
}
