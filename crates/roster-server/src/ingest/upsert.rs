//! Transactional reconciliation of a validated batch against the store

use roster_common::Employee;
use roster_ingest::ValidatedBatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::DbResult;
use crate::store::EmployeeStore;

/// Outcome of one [`UpsertEngine::upsert`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
}

impl UpsertStats {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Clone)]
pub struct UpsertEngine {
    store: Arc<dyn EmployeeStore>,
}

impl UpsertEngine {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    /// Insert-or-update every record of `batch` in file order, in one transaction.
    ///
    /// Existing records keep their id and take the incoming login, name and
    /// salary. On any error the transaction is dropped uncommitted and the
    /// store is left as it was.
    #[tracing::instrument(skip_all, fields(records = batch.len()))]
    pub async fn upsert(&self, batch: &ValidatedBatch) -> DbResult<UpsertStats> {
        let mut tx = self.store.begin().await?;
        let mut stats = UpsertStats::default();

        for incoming in batch.records() {
            match tx.find_by_id(&incoming.id).await? {
                Some(mut existing) => {
                    existing.merge_from(incoming);
                    tx.save(&existing).await?;
                    stats.updated += 1;
                    debug!(id = %incoming.id, "Employee updated");
                },
                None => {
                    tx.save(incoming).await?;
                    stats.inserted += 1;
                    debug!(id = %incoming.id, "Employee inserted");
                },
            }
        }

        tx.commit().await?;

        info!(
            inserted = stats.inserted,
            updated = stats.updated,
            "Batch committed"
        );

        Ok(stats)
    }

    /// Ids of `records` that already exist in the store, in input order
    pub async fn find_duplicate_ids(&self, records: &[Employee]) -> DbResult<Vec<String>> {
        let ids: Vec<String> = records.iter().map(|e| e.id.clone()).collect();
        self.store.existing_ids(&ids).await
    }

    /// Logins of `records` that already exist in the store, in input order
    pub async fn find_duplicate_logins(&self, records: &[Employee]) -> DbResult<Vec<String>> {
        let logins: Vec<String> = records.iter().map(|e| e.login.clone()).collect();
        self.store.existing_logins(&logins).await
    }
}
