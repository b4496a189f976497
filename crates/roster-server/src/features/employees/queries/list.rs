use bigdecimal::BigDecimal;
use mediator::Request;
use roster_common::Employee;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::features::FeatureState;
use crate::store::{PageRequest, SortDirection, SortField, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Employees whose salary lies in `[min_salary, max_salary]`, one page at a time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEmployeesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<BigDecimal>,
    /// Zero-based page index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEmployeesResponse {
    pub items: Vec<Employee>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        let pages = (total + limit_i - 1) / limit_i;
        Self {
            page,
            limit,
            total,
            pages,
            has_next: i64::from(page) + 1 < pages,
            has_prev: page > 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListEmployeesError {
    #[error("min_salary is required")]
    MinSalaryRequired,
    #[error("max_salary is required")]
    MaxSalaryRequired,
    #[error("min_salary must not be greater than max_salary")]
    InvalidRange,
    #[error("Limit must be between 1 and 1000")]
    InvalidLimit,
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl Request<Result<ListEmployeesResponse, ListEmployeesError>> for ListEmployeesQuery {}

impl crate::cqrs::middleware::Query for ListEmployeesQuery {}

impl ListEmployeesQuery {
    pub fn new(min_salary: BigDecimal, max_salary: BigDecimal) -> Self {
        Self {
            min_salary: Some(min_salary),
            max_salary: Some(max_salary),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(&BigDecimal, &BigDecimal), ListEmployeesError> {
        let min = self
            .min_salary
            .as_ref()
            .ok_or(ListEmployeesError::MinSalaryRequired)?;
        let max = self
            .max_salary
            .as_ref()
            .ok_or(ListEmployeesError::MaxSalaryRequired)?;
        if min > max {
            return Err(ListEmployeesError::InvalidRange);
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_LIMIT {
                return Err(ListEmployeesError::InvalidLimit);
            }
        }
        Ok((min, max))
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
        .sorted(
            self.sort_by.unwrap_or_default(),
            self.direction.unwrap_or_default(),
        )
    }
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    query: ListEmployeesQuery,
) -> Result<ListEmployeesResponse, ListEmployeesError> {
    let (min, max) = query.validate()?;
    let page = query.page_request();

    let total = state.store.count_by_salary_between(min, max).await?;
    let items = state.store.find_by_salary_between(min, max, &page).await?;

    tracing::debug!(total, returned = items.len(), "Employees listed");

    Ok(ListEmployeesResponse {
        items,
        pagination: PaginationMetadata::new(page.page, page.limit, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEmployeeStore;
    use std::str::FromStr;
    use std::sync::Arc;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ListEmployeesQuery::default().validate(),
            Err(ListEmployeesError::MinSalaryRequired)
        ));
        assert!(matches!(
            ListEmployeesQuery::new(dec("10"), dec("1")).validate(),
            Err(ListEmployeesError::InvalidRange)
        ));

        let mut query = ListEmployeesQuery::new(dec("0"), dec("1"));
        query.limit = Some(MAX_PAGE_LIMIT + 1);
        assert!(matches!(query.validate(), Err(ListEmployeesError::InvalidLimit)));
        query.limit = Some(0);
        assert!(matches!(query.validate(), Err(ListEmployeesError::InvalidLimit)));
    }

    #[test]
    fn test_page_request_defaults() {
        let page = ListEmployeesQuery::new(dec("0"), dec("1")).page_request();
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn test_pagination_metadata() {
        let meta = PaginationMetadata::new(0, 30, 61);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let last = PaginationMetadata::new(2, 30, 61);
        assert!(!last.has_next);
        assert!(last.has_prev);

        assert_eq!(PaginationMetadata::new(0, 30, 0).pages, 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let store = InMemoryEmployeeStore::with_records([
            Employee::new("1", "a", "A", dec("100")),
            Employee::new("2", "b", "B", dec("250.50")),
            Employee::new("3", "c", "C", dec("999")),
        ]);
        let state = FeatureState::new(Arc::new(store));

        let mut query = ListEmployeesQuery::new(dec("100"), dec("500"));
        query.sort_by = Some(SortField::Salary);
        query.direction = Some(SortDirection::Desc);

        let response = handle(state, query).await.unwrap();
        let ids: Vec<_> = response.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(response.pagination.total, 2);
    }
}
