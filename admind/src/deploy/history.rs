//! Deployment history store
//!
//! Append-only record of pipeline outcomes, independent of the current
//! registry state. Identical keys (same plugin, version and timestamp) are
//! not deduplicated; the last write wins.

use std::sync::Arc;

use crate::deploy::model::Deployment;
use crate::errors::AdminError;
use crate::storage::store::SystemStore;

pub const DEPLOYMENT_HISTORY_TABLE: &str = "pluton_deployment_history";

pub struct HistoryStore {
    store: Arc<dyn SystemStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn SystemStore>) -> Self {
        Self { store }
    }

    /// Persist a resolved deployment record.
    pub async fn append(&self, dep: &Deployment) -> Result<(), AdminError> {
        self.store.create_table(DEPLOYMENT_HISTORY_TABLE).await?;
        self.store
            .save(
                DEPLOYMENT_HISTORY_TABLE,
                &dep.record_key(),
                serde_json::to_value(dep)?,
            )
            .await
    }

    /// All records, most recent first. The sort is lexicographic over the
    /// raw timestamp text as captured from the build log, not over a
    /// parsed instant.
    pub async fn list(&self) -> Result<Vec<Deployment>, AdminError> {
        let mut records = self
            .store
            .list(DEPLOYMENT_HISTORY_TABLE)
            .await?
            .into_iter()
            .map(|r| serde_json::from_value::<Deployment>(r).map_err(AdminError::from))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}
