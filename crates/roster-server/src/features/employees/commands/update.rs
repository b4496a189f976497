//! Update employee command
//!
//! Overwrites login, name and salary of an existing employee. The id comes
//! from the request path and never changes.

use bigdecimal::BigDecimal;
use mediator::Request;
use roster_common::Employee;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::features::shared::validation::{
    validate_required, validate_salary, FieldValidationError,
};
use crate::features::FeatureState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmployeeCommand {
    #[serde(default)]
    pub id: String,
    pub login: String,
    pub name: String,
    pub salary: BigDecimal,
}

pub type UpdateEmployeeResponse = Employee;

#[derive(Debug, thiserror::Error)]
pub enum UpdateEmployeeError {
    #[error("Id is required and cannot be empty")]
    IdRequired,
    #[error(transparent)]
    Validation(#[from] FieldValidationError),
    #[error("Employee '{0}' not found")]
    NotFound(String),
    #[error("Login '{0}' is already used by another employee")]
    LoginTaken(String),
    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for UpdateEmployeeError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}

impl Request<Result<UpdateEmployeeResponse, UpdateEmployeeError>> for UpdateEmployeeCommand {}

impl crate::cqrs::middleware::Command for UpdateEmployeeCommand {}

impl UpdateEmployeeCommand {
    pub fn validate(&self) -> Result<(), UpdateEmployeeError> {
        if self.id.trim().is_empty() {
            return Err(UpdateEmployeeError::IdRequired);
        }
        validate_required(&self.login, "Login")?;
        validate_required(&self.name, "Name")?;
        validate_salary(&self.salary)?;
        Ok(())
    }
}

#[tracing::instrument(skip(state, command), fields(id = %command.id))]
pub async fn handle(
    state: FeatureState,
    command: UpdateEmployeeCommand,
) -> Result<UpdateEmployeeResponse, UpdateEmployeeError> {
    command.validate()?;

    let mut tx = state.store.begin().await?;

    let mut employee = tx
        .find_by_id(&command.id)
        .await?
        .ok_or_else(|| UpdateEmployeeError::NotFound(command.id.clone()))?;

    let incoming = Employee::new(
        command.id.clone(),
        command.login.clone(),
        command.name.clone(),
        command.salary.clone(),
    );
    employee.merge_from(&incoming);

    let saved = tx.save(&employee).await;
    let saved = match saved {
        Ok(()) => tx.commit().await,
        Err(e) => Err(e),
    };

    match saved {
        Ok(()) => {
            tracing::info!(login = %employee.login, "Employee updated");
            Ok(employee)
        },
        Err(DbError::Duplicate(_)) => Err(UpdateEmployeeError::LoginTaken(command.login)),
        Err(e) => Err(e.into()),
    }
}
