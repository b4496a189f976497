//! Helpers shared by the feature slices

pub mod validation;

pub use validation::{validate_required, validate_salary, FieldValidationError};
