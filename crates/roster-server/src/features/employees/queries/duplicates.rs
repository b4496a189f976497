//! Pre-flight check reporting which records of a candidate batch already exist

use mediator::Request;
use roster_common::Employee;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::features::FeatureState;
use crate::ingest::UpsertEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindDuplicatesQuery {
    pub records: Vec<Employee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindDuplicatesResponse {
    /// Ids already persisted, in input order
    pub ids: Vec<String>,
    /// Logins already persisted, in input order
    pub logins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FindDuplicatesError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl Request<Result<FindDuplicatesResponse, FindDuplicatesError>> for FindDuplicatesQuery {}

impl crate::cqrs::middleware::Query for FindDuplicatesQuery {}

#[tracing::instrument(skip(state, query), fields(records = query.records.len()))]
pub async fn handle(
    state: FeatureState,
    query: FindDuplicatesQuery,
) -> Result<FindDuplicatesResponse, FindDuplicatesError> {
    let engine = UpsertEngine::new(state.store.clone());

    let ids = engine.find_duplicate_ids(&query.records).await?;
    let logins = engine.find_duplicate_logins(&query.records).await?;

    Ok(FindDuplicatesResponse { ids, logins })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEmployeeStore;
    use bigdecimal::BigDecimal;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reports_existing_ids_and_logins() {
        let store = InMemoryEmployeeStore::with_records([
            Employee::new("1", "john", "John", BigDecimal::from(1)),
            Employee::new("2", "jane", "Jane", BigDecimal::from(2)),
        ]);
        let query = FindDuplicatesQuery {
            records: vec![
                Employee::new("3", "jane", "Other Jane", BigDecimal::from(3)),
                Employee::new("1", "new", "New", BigDecimal::from(4)),
            ],
        };

        let response = handle(FeatureState::new(Arc::new(store)), query).await.unwrap();
        assert_eq!(response.ids, vec!["1".to_string()]);
        assert_eq!(response.logins, vec!["jane".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_request() {
        let query = FindDuplicatesQuery { records: vec![] };
        let response = handle(FeatureState::new(Arc::new(InMemoryEmployeeStore::new())), query)
            .await
            .unwrap();
        assert!(response.ids.is_empty());
        assert!(response.logins.is_empty());
    }
}
