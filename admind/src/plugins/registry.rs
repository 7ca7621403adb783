//! Plugin registry collaborator

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authn::identity::AdminUser;
use crate::errors::AdminError;
use crate::plugins::ident;
use crate::storage::store::SystemStore;

pub const PLUGIN_METADATA_TABLE: &str = "pluton_plugin_metadata";

/// Registry record for one deployed plugin version.
///
/// `id` is the combined `<name>-<id>-<version>` key; see [`crate::plugins::ident`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    pub id: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Narrow interface over the plugin registry.
#[async_trait]
pub trait PluginRegistry: Send + Sync {
    /// All metadata records currently known to the registry.
    async fn list_metadata(&self) -> Result<Vec<PluginMetadata>, AdminError>;

    /// Flip the enabled state of a record. The mutator does not report the
    /// post-state; callers re-read the registry for the authoritative view.
    async fn change_state(&self, meta: &PluginMetadata, user: &AdminUser)
        -> Result<(), AdminError>;

    /// Delete the record matching `(plugin_id, version)`; returns whether a
    /// record was removed.
    async fn delete(
        &self,
        plugin_id: i32,
        version: f64,
        user: &AdminUser,
    ) -> Result<bool, AdminError>;
}

/// Registry backed by the system store.
pub struct StoreRegistry {
    store: Arc<dyn SystemStore>,
}

impl StoreRegistry {
    pub fn new(store: Arc<dyn SystemStore>) -> Self {
        Self { store }
    }

    /// Register or replace a metadata record. Used by runtime bootstrap and
    /// test fixtures; the admin API itself never creates records.
    pub async fn put(&self, meta: &PluginMetadata) -> Result<(), AdminError> {
        self.store.create_table(PLUGIN_METADATA_TABLE).await?;
        self.store
            .save(PLUGIN_METADATA_TABLE, &meta.id, serde_json::to_value(meta)?)
            .await
    }
}

#[async_trait]
impl PluginRegistry for StoreRegistry {
    async fn list_metadata(&self) -> Result<Vec<PluginMetadata>, AdminError> {
        let records = self.store.list(PLUGIN_METADATA_TABLE).await?;
        records
            .into_iter()
            .map(|r| serde_json::from_value(r).map_err(AdminError::from))
            .collect()
    }

    async fn change_state(
        &self,
        meta: &PluginMetadata,
        user: &AdminUser,
    ) -> Result<(), AdminError> {
        tracing::info!(
            plugin = %meta.id,
            enabled = !meta.enabled,
            user = %user.username,
            "changing plugin state"
        );
        let updated = PluginMetadata {
            id: meta.id.clone(),
            enabled: !meta.enabled,
            last_modified: Some(Utc::now()),
        };
        self.store
            .save(
                PLUGIN_METADATA_TABLE,
                &updated.id,
                serde_json::to_value(&updated)?,
            )
            .await
    }

    async fn delete(
        &self,
        plugin_id: i32,
        version: f64,
        user: &AdminUser,
    ) -> Result<bool, AdminError> {
        for meta in self.list_metadata().await? {
            let Ok(ident) = ident::decode(&meta.id) else {
                continue;
            };
            if ident.id == plugin_id && ident.version == version {
                tracing::info!(plugin = %meta.id, user = %user.username, "deleting plugin version");
                return self.store.delete(PLUGIN_METADATA_TABLE, &meta.id).await;
            }
        }
        Ok(false)
    }
}
