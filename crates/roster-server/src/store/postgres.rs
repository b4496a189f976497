//! PostgreSQL-backed employee store

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use roster_common::Employee;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;
use tracing::debug;

use super::{EmployeeStore, EmployeeTransaction, PageRequest};
use crate::db::{self, DbError, DbResult};

const UPSERT_SQL: &str = r#"
    INSERT INTO employees (id, login, name, salary)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (id) DO UPDATE
    SET login = EXCLUDED.login,
        name = EXCLUDED.name,
        salary = EXCLUDED.salary,
        updated_at = NOW()
"#;

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    login: String,
    name: String,
    salary: BigDecimal,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee::new(row.id, row.login, row.name, row.salary)
    }
}

#[derive(Debug, Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn keep_found(candidates: &[String], found: Vec<String>) -> Vec<String> {
    let found: HashSet<String> = found.into_iter().collect();
    candidates
        .iter()
        .filter(|c| found.contains(c.as_str()))
        .cloned()
        .collect()
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn exists_by_id(&self, id: &str) -> DbResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_login(&self, login: &str) -> DbResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE login = $1)",
        )
        .bind(login)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn existing_ids(&self, ids: &[String]) -> DbResult<Vec<String>> {
        let found =
            sqlx::query_scalar::<_, String>("SELECT id FROM employees WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(keep_found(ids, found))
    }

    async fn existing_logins(&self, logins: &[String]) -> DbResult<Vec<String>> {
        let found =
            sqlx::query_scalar::<_, String>("SELECT login FROM employees WHERE login = ANY($1)")
                .bind(logins)
                .fetch_all(&self.pool)
                .await?;
        Ok(keep_found(logins, found))
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, login, name, salary FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Employee::from))
    }

    async fn save(&self, employee: &Employee) -> DbResult<()> {
        sqlx::query(UPSERT_SQL)
            .bind(&employee.id)
            .bind(&employee.login)
            .bind(&employee.name)
            .bind(&employee.salary)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from_unique_violation(e, "Login", &employee.login))?;
        Ok(())
    }

    async fn find_by_salary_between(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
        page: &PageRequest,
    ) -> DbResult<Vec<Employee>> {
        // Column and direction come from closed enums, never from user text.
        let sql = format!(
            "SELECT id, login, name, salary FROM employees \
             WHERE salary BETWEEN $1 AND $2 \
             ORDER BY {} {}, id ASC \
             LIMIT $3 OFFSET $4",
            page.sort_by.column(),
            page.direction.keyword()
        );

        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(min)
            .bind(max)
            .bind(i64::from(page.limit))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn count_by_salary_between(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
    ) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employees WHERE salary BETWEEN $1 AND $2",
        )
        .bind(min)
        .bind(max)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn begin(&self) -> DbResult<Box<dyn EmployeeTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgEmployeeTransaction { tx }))
    }

    async fn health_check(&self) -> DbResult<()> {
        db::health_check(&self.pool).await
    }
}

/// Transaction over the employees table. Login uniqueness is deferred to
/// commit, so records may trade logins within one batch.
pub struct PgEmployeeTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EmployeeTransaction for PgEmployeeTransaction {
    async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, login, name, salary FROM employees WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Employee::from))
    }

    async fn save(&mut self, employee: &Employee) -> DbResult<()> {
        sqlx::query(UPSERT_SQL)
            .bind(&employee.id)
            .bind(&employee.login)
            .bind(&employee.name)
            .bind(&employee.salary)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DbError::from_unique_violation(e, "Login", &employee.login))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx.commit().await.map_err(|e| {
            if db::is_unique_violation(&e) {
                debug!("Commit failed on deferred login uniqueness");
                DbError::Duplicate("Login already exists".to_string())
            } else {
                DbError::Sqlx(e)
            }
        })
    }
}
