//! Process-local employee store
//!
//! Transactions hold the store lock from `begin` until commit or drop, so they
//! run one at a time. Writes are staged and applied only on commit.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use roster_common::Employee;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{EmployeeStore, EmployeeTransaction, PageRequest, SortDirection, SortField};
use crate::db::{DbError, DbResult};

type Records = BTreeMap<String, Employee>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeStore {
    records: Arc<Mutex<Records>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `employees`, later ids overwriting earlier ones
    pub fn with_records(employees: impl IntoIterator<Item = Employee>) -> Self {
        let records = employees
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect::<Records>();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Snapshot of every record, ordered by id
    pub async fn all(&self) -> Vec<Employee> {
        self.records.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

/// Fails when a login is held by two different ids
fn check_logins<'a>(records: impl Iterator<Item = &'a Employee>) -> DbResult<()> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for employee in records {
        if let Some(owner) = owners.insert(employee.login.as_str(), employee.id.as_str()) {
            if owner != employee.id {
                return Err(DbError::duplicate("Login", &employee.login));
            }
        }
    }
    Ok(())
}

fn compare(a: &Employee, b: &Employee, field: SortField) -> std::cmp::Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Login => a.login.cmp(&b.login),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Salary => a.salary.cmp(&b.salary),
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn exists_by_id(&self, id: &str) -> DbResult<bool> {
        Ok(self.records.lock().await.contains_key(id))
    }

    async fn exists_by_login(&self, login: &str) -> DbResult<bool> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .any(|e| e.login == login))
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn save(&self, employee: &Employee) -> DbResult<()> {
        let mut records = self.records.lock().await;
        let taken = records
            .values()
            .any(|e| e.login == employee.login && e.id != employee.id);
        if taken {
            return Err(DbError::duplicate("Login", &employee.login));
        }
        records.insert(employee.id.clone(), employee.clone());
        Ok(())
    }

    async fn find_by_salary_between(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
        page: &PageRequest,
    ) -> DbResult<Vec<Employee>> {
        let records = self.records.lock().await;
        let mut matches: Vec<Employee> = records
            .values()
            .filter(|e| &e.salary >= min && &e.salary <= max)
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            let primary = compare(a, b, page.sort_by);
            let primary = match page.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(matches
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .collect())
    }

    async fn count_by_salary_between(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
    ) -> DbResult<i64> {
        let count = self
            .records
            .lock()
            .await
            .values()
            .filter(|e| &e.salary >= min && &e.salary <= max)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn begin(&self) -> DbResult<Box<dyn EmployeeTransaction>> {
        let records = Arc::clone(&self.records).lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            records,
            staged: Records::new(),
        }))
    }
}

pub struct InMemoryTransaction {
    records: OwnedMutexGuard<Records>,
    staged: Records,
}

#[async_trait]
impl EmployeeTransaction for InMemoryTransaction {
    async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Employee>> {
        Ok(self
            .staged
            .get(id)
            .or_else(|| self.records.get(id))
            .cloned())
    }

    async fn save(&mut self, employee: &Employee) -> DbResult<()> {
        self.staged.insert(employee.id.clone(), employee.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let InMemoryTransaction {
            mut records,
            staged,
        } = *self;

        let untouched = records.values().filter(|e| !staged.contains_key(&e.id));
        check_logins(untouched.chain(staged.values()))?;

        records.extend(staged);
        Ok(())
    }
}
