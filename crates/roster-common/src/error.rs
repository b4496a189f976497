//! Error types shared across Roster crates

use thiserror::Error;

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid salary '{0}': must be a decimal value >= 0")]
    InvalidSalary(String),
}
