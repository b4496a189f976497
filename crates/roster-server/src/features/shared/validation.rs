//! Field-level validation for request payloads

use bigdecimal::BigDecimal;
use roster_common::types::ensure_valid_salary;
use thiserror::Error;

/// Longest accepted value for a text field
pub const MAX_FIELD_LENGTH: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must not exceed {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("Salary must be a decimal value >= 0.0")]
    InvalidSalary,
}

/// Non-blank and at most [`MAX_FIELD_LENGTH`] characters
pub fn validate_required(value: &str, field: &'static str) -> Result<(), FieldValidationError> {
    if value.trim().is_empty() {
        return Err(FieldValidationError::Required { field });
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(FieldValidationError::TooLong {
            field,
            max_length: MAX_FIELD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_salary(salary: &BigDecimal) -> Result<(), FieldValidationError> {
    ensure_valid_salary(salary).map_err(|_| FieldValidationError::InvalidSalary)
}
