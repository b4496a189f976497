//! Persistent employee store
//!
//! [`EmployeeStore`] is the contract the upsert pipeline and the read-side
//! queries are written against. Two implementations ship with the server:
//! [`PgEmployeeStore`] backed by PostgreSQL and [`InMemoryEmployeeStore`] for
//! local runs and tests.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use roster_common::Employee;
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEmployeeStore;
pub use postgres::PgEmployeeStore;

/// Default page size for listings
pub const DEFAULT_PAGE_LIMIT: u32 = 30;

/// Largest page size a caller may request
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Column a listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Id,
    Login,
    Name,
    Salary,
}

impl SortField {
    /// Column name, safe to splice into SQL
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Login => "login",
            SortField::Name => "name",
            SortField::Salary => "salary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Zero-based page selection plus ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub direction: SortDirection,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn sorted(mut self, sort_by: SortField, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.direction = direction;
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            limit: DEFAULT_PAGE_LIMIT,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

/// Store-backed unit of work
///
/// Dropping a transaction without calling [`EmployeeTransaction::commit`]
/// discards every write made through it.
#[async_trait]
pub trait EmployeeTransaction: Send {
    /// Look up a record and hold it until the transaction ends
    async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Employee>>;

    /// Insert the record, or overwrite the record with the same id
    async fn save(&mut self, employee: &Employee) -> DbResult<()>;

    async fn commit(self: Box<Self>) -> DbResult<()>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn exists_by_id(&self, id: &str) -> DbResult<bool>;

    async fn exists_by_login(&self, login: &str) -> DbResult<bool>;

    /// The subset of `ids` already persisted, in input order
    async fn existing_ids(&self, ids: &[String]) -> DbResult<Vec<String>> {
        let mut found = Vec::new();
        for id in ids {
            if self.exists_by_id(id).await? {
                found.push(id.clone());
            }
        }
        Ok(found)
    }

    /// The subset of `logins` already persisted, in input order
    async fn existing_logins(&self, logins: &[String]) -> DbResult<Vec<String>> {
        let mut found = Vec::new();
        for login in logins {
            if self.exists_by_login(login).await? {
                found.push(login.clone());
            }
        }
        Ok(found)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Employee>>;

    /// Insert the record, or overwrite the record with the same id
    async fn save(&self, employee: &Employee) -> DbResult<()>;

    /// Save every record in one transaction
    async fn save_all(&self, employees: &[Employee]) -> DbResult<()> {
        let mut tx = self.begin().await?;
        for employee in employees {
            tx.save(employee).await?;
        }
        tx.commit().await
    }

    /// Records with `min <= salary <= max`, ordered and paged by `page`
    async fn find_by_salary_between(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
        page: &PageRequest,
    ) -> DbResult<Vec<Employee>>;

    async fn count_by_salary_between(&self, min: &BigDecimal, max: &BigDecimal)
        -> DbResult<i64>;

    async fn begin(&self) -> DbResult<Box<dyn EmployeeTransaction>>;

    async fn health_check(&self) -> DbResult<()> {
        Ok(())
    }
}
