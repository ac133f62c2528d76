//! Field validation helpers
//!
//! Domain payloads derive `validator::Validate`; this module flattens the
//! resulting error tree into `field: message` lines for `PortError`.

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::ports::PortError;

/// Flattens validation errors into sorted `field: message` lines
///
/// `prefix` is prepended to every field name, which is how bulk requests
/// report the index of the failing item (`[2].username: ...`).
pub fn field_errors(prefix: Option<&str>, errors: &ValidationErrors) -> Vec<String> {
    let mut lines = Vec::new();
    collect(prefix.unwrap_or_default(), errors, &mut lines);
    lines.sort();
    lines
}

fn collect(prefix: &str, errors: &ValidationErrors, lines: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(items) => {
                for item in items {
                    let message = item
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| item.code.to_string());
                    lines.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(&path, nested, lines),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect(&format!("{}[{}]", path, index), nested, lines);
                }
            }
        }
    }
}

/// Checks a decimal against a fixed precision column
///
/// `max_digits` counts digits on both sides of the point; trailing zeros in
/// the fraction are ignored.
pub fn decimal_precision(
    value: &Decimal,
    max_digits: u32,
    decimal_places: u32,
) -> Result<(), ValidationError> {
    let normalized = value.normalize();
    if normalized.scale() > decimal_places {
        let mut error = ValidationError::new("decimal_places");
        error.message = Some(format!("no more than {} decimal places allowed", decimal_places).into());
        return Err(error);
    }

    let whole = normalized.abs().trunc();
    let whole_digits = if whole.is_zero() { 0 } else { whole.to_string().len() as u32 };
    let max_whole = max_digits.saturating_sub(decimal_places);
    if whole_digits > max_whole {
        let mut error = ValidationError::new("max_digits");
        error.message = Some(format!("no more than {} digits before the decimal point", max_whole).into());
        return Err(error);
    }

    Ok(())
}

impl From<ValidationErrors> for PortError {
    fn from(errors: ValidationErrors) -> Self {
        PortError::validation_details("Invalid input", field_errors(None, &errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_errors() -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let mut name = ValidationError::new("length");
        name.message = Some("must be between 1 and 150 characters".into());
        errors.add("patient_name", name);
        errors.add("type_of_plan", ValidationError::new("required"));
        errors
    }

    #[test]
    fn test_field_errors_are_sorted_lines() {
        let lines = field_errors(None, &sample_errors());
        assert_eq!(
            lines,
            vec![
                "patient_name: must be between 1 and 150 characters".to_string(),
                "type_of_plan: required".to_string(),
            ]
        );
    }

    #[test]
    fn test_prefix_marks_bulk_index() {
        let lines = field_errors(Some("[3]"), &sample_errors());
        assert!(lines.iter().all(|l| l.starts_with("[3].")));
    }

    #[test]
    fn test_into_port_error() {
        let error: PortError = sample_errors().into();
        assert!(error.is_validation());
    }

    #[test]
    fn test_decimal_precision() {
        assert!(decimal_precision(&dec!(12.50), 5, 2).is_ok());
        assert!(decimal_precision(&dec!(999.99), 5, 2).is_ok());
        assert!(decimal_precision(&dec!(0.5), 5, 2).is_ok());
        assert!(decimal_precision(&dec!(-999.99), 5, 2).is_ok());
        assert!(decimal_precision(&dec!(1000), 5, 2).is_err());
        assert!(decimal_precision(&dec!(1.234), 5, 2).is_err());
        assert!(decimal_precision(&dec!(12345678.90), 10, 2).is_ok());
        assert!(decimal_precision(&dec!(123456789), 10, 2).is_err());
    }
}
