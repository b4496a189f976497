//! Domain types shared by the ingest pipeline and the server

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, RosterError};

/// Prefix marking a data row as a comment
pub const COMMENT_PREFIX: char = '#';

/// One employee record
///
/// `id` is the primary key and never changes once persisted; `login` is unique
/// across persisted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub login: String,
    pub name: String,
    pub salary: BigDecimal,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        login: impl Into<String>,
        name: impl Into<String>,
        salary: BigDecimal,
    ) -> Self {
        Self {
            id: id.into(),
            login: login.into(),
            name: name.into(),
            salary,
        }
    }

    /// Rows whose id starts with `#` are comments
    pub fn is_comment(&self) -> bool {
        self.id.starts_with(COMMENT_PREFIX)
    }

    /// Overwrite the mutable fields with those of `other`, keeping `self.id`
    pub fn merge_from(&mut self, other: &Employee) {
        self.login.clone_from(&other.login);
        self.name.clone_from(&other.name);
        self.salary.clone_from(&other.salary);
    }
}

/// Parse a salary, accepting only decimals `>= 0`
pub fn parse_salary(raw: &str) -> Result<BigDecimal> {
    let salary =
        BigDecimal::from_str(raw).map_err(|_| RosterError::InvalidSalary(raw.to_string()))?;
    ensure_valid_salary(&salary).map_err(|_| RosterError::InvalidSalary(raw.to_string()))?;
    Ok(salary)
}

/// Non-negative, with a scale that fits in 32 bits
pub fn ensure_valid_salary(salary: &BigDecimal) -> Result<()> {
    ensure_scale_in_range(salary)?;
    ensure_non_negative(salary)
}

pub fn ensure_non_negative(salary: &BigDecimal) -> Result<()> {
    if *salary < BigDecimal::from(0) {
        return Err(RosterError::InvalidSalary(salary.to_string()));
    }
    Ok(())
}

// NUMERIC columns and most decimal libraries cap the exponent at i32.
fn ensure_scale_in_range(salary: &BigDecimal) -> Result<()> {
    let (_, scale) = salary.as_bigint_and_exponent();
    if i32::try_from(scale).is_err() {
        return Err(RosterError::InvalidSalary(format!("scale {scale} out of range")));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_salary_accepts_decimals() {
        assert_eq!(parse_salary("5000.00").unwrap(), BigDecimal::from_str("5000").unwrap());
        assert_eq!(parse_salary("0").unwrap(), BigDecimal::from(0));
        assert_eq!(parse_salary("1e3").unwrap(), BigDecimal::from(1000));
    }

    #[test]
    fn test_parse_salary_rejects_negative_and_garbage() {
        assert!(matches!(parse_salary("-5.00"), Err(RosterError::InvalidSalary(_))));
        assert!(matches!(parse_salary("abc"), Err(RosterError::InvalidSalary(_))));
        assert!(matches!(parse_salary(""), Err(RosterError::InvalidSalary(_))));
    }

    #[test]
    fn test_parse_salary_rejects_out_of_range_exponent() {
        assert!(matches!(
            parse_salary("1e9223372036854775807"),
            Err(RosterError::InvalidSalary(ref raw)) if raw == "1e9223372036854775807"
        ));
        assert!(matches!(parse_salary("1e-3000000000"), Err(RosterError::InvalidSalary(_))));
    }

    #[test]
    fn test_merge_keeps_id() {
        let mut existing = Employee::new("1", "john", "John Doe", BigDecimal::from(5000));
        let incoming = Employee::new("99", "johnny", "Johnny Doe", BigDecimal::from(7000));

        existing.merge_from(&incoming);

        assert_eq!(existing.id, "1");
        assert_eq!(existing.login, "johnny");
        assert_eq!(existing.name, "Johnny Doe");
        assert_eq!(existing.salary, BigDecimal::from(7000));
    }

    #[test]
    fn test_comment_detection() {
        let comment = Employee::new("#1", "x", "y", BigDecimal::from(1));
        assert!(comment.is_comment());
        assert!(!Employee::new("1#", "x", "y", BigDecimal::from(1)).is_comment());
    }
}
