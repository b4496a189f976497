//! Whole-batch validation
//!
//! A batch is accepted only if every non-comment row is complete and no id or
//! login appears twice. One bad row rejects the entire file.

use roster_common::Employee;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Reason a batch was rejected. `row` is the 1-based data row index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchRejection {
    #[error("Row {row}: {field} is required and cannot be empty")]
    MissingField { row: usize, field: &'static str },

    #[error("Row {row}: duplicate id '{id}' within the file")]
    DuplicateId { row: usize, id: String },

    #[error("Row {row}: duplicate login '{login}' within the file")]
    DuplicateLogin { row: usize, login: String },
}

/// Records that passed [`BatchValidator::validate`], comment rows removed.
///
/// Only the validator constructs this type, so anything holding one has been
/// checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBatch {
    records: Vec<Employee>,
    comments_skipped: usize,
}

impl ValidatedBatch {
    pub fn records(&self) -> &[Employee] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Employee> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn comments_skipped(&self) -> usize {
        self.comments_skipped
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchValidator;

impl BatchValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, rows: Vec<Employee>) -> Result<ValidatedBatch, BatchRejection> {
        let mut ids = HashSet::with_capacity(rows.len());
        let mut logins = HashSet::with_capacity(rows.len());

        for (index, employee) in rows.iter().enumerate() {
            if employee.is_comment() {
                continue;
            }
            if let Err(rejection) = check_row(employee, index + 1, &mut ids, &mut logins) {
                warn!(%rejection, "Batch rejected");
                return Err(rejection);
            }
        }

        let total = rows.len();
        let records: Vec<Employee> = rows.into_iter().filter(|e| !e.is_comment()).collect();
        let comments_skipped = total - records.len();

        debug!(accepted = records.len(), comments_skipped, "Batch validated");
        Ok(ValidatedBatch {
            records,
            comments_skipped,
        })
    }
}

fn check_row<'a>(
    employee: &'a Employee,
    row: usize,
    ids: &mut HashSet<&'a str>,
    logins: &mut HashSet<&'a str>,
) -> Result<(), BatchRejection> {
    for (field, value) in [
        ("id", &employee.id),
        ("login", &employee.login),
        ("name", &employee.name),
    ] {
        if value.trim().is_empty() {
            return Err(BatchRejection::MissingField { row, field });
        }
    }

    if !ids.insert(employee.id.as_str()) {
        return Err(BatchRejection::DuplicateId {
            row,
            id: employee.id.clone(),
        });
    }

    if !logins.insert(employee.login.as_str()) {
        return Err(BatchRejection::DuplicateLogin {
            row,
            login: employee.login.clone(),
        });
    }

    Ok(())
}
