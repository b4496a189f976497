use mediator::Request;
use roster_common::Employee;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::features::FeatureState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEmployeeQuery {
    pub id: String,
}

pub type GetEmployeeResponse = Employee;

#[derive(Debug, thiserror::Error)]
pub enum GetEmployeeError {
    #[error("Id is required and cannot be empty")]
    IdRequired,
    #[error("Employee '{0}' not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl Request<Result<GetEmployeeResponse, GetEmployeeError>> for GetEmployeeQuery {}

impl crate::cqrs::middleware::Query for GetEmployeeQuery {}

impl GetEmployeeQuery {
    pub fn validate(&self) -> Result<(), GetEmployeeError> {
        if self.id.trim().is_empty() {
            return Err(GetEmployeeError::IdRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    query: GetEmployeeQuery,
) -> Result<GetEmployeeResponse, GetEmployeeError> {
    query.validate()?;

    state
        .store
        .find_by_id(&query.id)
        .await?
        .ok_or(GetEmployeeError::NotFound(query.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEmployeeStore;
    use bigdecimal::BigDecimal;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let store = InMemoryEmployeeStore::with_records([Employee::new(
            "1",
            "jdoe",
            "John Doe",
            BigDecimal::from(5000),
        )]);
        let state = FeatureState::new(Arc::new(store));

        let found = handle(state.clone(), GetEmployeeQuery { id: "1".to_string() })
            .await
            .unwrap();
        assert_eq!(found.login, "jdoe");

        let err = handle(state, GetEmployeeQuery { id: "2".to_string() }).await.unwrap_err();
        assert!(matches!(err, GetEmployeeError::NotFound(id) if id == "2"));
    }

    #[test]
    fn test_validation_blank_id() {
        let query = GetEmployeeQuery { id: " ".to_string() };
        assert!(matches!(query.validate(), Err(GetEmployeeError::IdRequired)));
    }
}
