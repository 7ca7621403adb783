//! Plugin listing and lifecycle control

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::authn::identity::AdminUser;
use crate::errors::AdminError;
use crate::plugins::ident;
use crate::plugins::registry::{PluginMetadata, PluginRegistry};

/// Decoded identity half of a listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: i32,
    pub name: String,
    pub version: String,
}

/// Read-view pairing a plugin's identity with its registry record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSummary {
    pub plugin_info: PluginInfo,
    pub metadata: PluginMetadata,
}

impl PluginSummary {
    fn from_metadata(metadata: PluginMetadata) -> Result<Self, AdminError> {
        let ident = ident::decode(&metadata.id)?;
        let version = ident.version_text();
        Ok(Self {
            plugin_info: PluginInfo {
                id: ident.id,
                name: ident.name,
                version,
            },
            metadata,
        })
    }
}

/// Listing order: ascending id, then *string* comparison of the rendered
/// version. "10.0" sorts before "2.0"; the order is part of the API
/// contract and deliberately not numeric.
pub fn summary_order(a: &PluginSummary, b: &PluginSummary) -> Ordering {
    a.plugin_info
        .id
        .cmp(&b.plugin_info.id)
        .then_with(|| a.plugin_info.version.cmp(&b.plugin_info.version))
}

/// Outcome of a state-change request.
#[derive(Debug)]
pub enum StateChangeOutcome {
    /// The registry was mutated; carries the re-read, authoritative record.
    Updated(PluginSummary),
    /// The record already held the desired state; nothing was written.
    Unchanged,
}

/// PATCH request body: the desired partial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChange {
    pub enabled: bool,
}

/// Lifecycle controller over the plugin registry.
///
/// State transitions are optimistic read-compare-apply-reread sequences
/// with no locking; two concurrent transitions for the same record race
/// and the last writer wins without a conflict signal.
pub struct LifecycleController {
    registry: Arc<dyn PluginRegistry>,
}

impl LifecycleController {
    pub fn new(registry: Arc<dyn PluginRegistry>) -> Self {
        Self { registry }
    }

    /// All deployed plugins, ordered per [`summary_order`].
    pub async fn list_plugins(&self) -> Result<Vec<PluginSummary>, AdminError> {
        let mut summaries: Vec<PluginSummary> = self
            .registry
            .list_metadata()
            .await?
            .into_iter()
            .filter_map(|meta| match PluginSummary::from_metadata(meta) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Skipping registry record with undecodable key: {}", e);
                    None
                }
            })
            .collect();
        summaries.sort_by(summary_order);
        Ok(summaries)
    }

    async fn find(
        &self,
        plugin_id: i32,
        version: f64,
    ) -> Result<Option<PluginMetadata>, AdminError> {
        let metadata = self.registry.list_metadata().await?;
        Ok(metadata.into_iter().find(|meta| {
            ident::decode(&meta.id)
                .map(|i| i.id == plugin_id && i.version == version)
                .unwrap_or(false)
        }))
    }

    /// Apply an enable/disable transition to the record at `(plugin_id, version)`.
    ///
    /// The registry mutator does not return the post-state, so a successful
    /// mutation is followed by a re-read and the refreshed record is what
    /// the caller gets back.
    pub async fn change_state(
        &self,
        plugin_id: i32,
        version: f64,
        desired: &StateChange,
        user: &AdminUser,
    ) -> Result<StateChangeOutcome, AdminError> {
        let Some(current) = self.find(plugin_id, version).await? else {
            return Err(AdminError::NotFound(format!(
                "No plugin with id {} and version {}",
                plugin_id,
                ident::format_version(version)
            )));
        };

        if current.enabled == desired.enabled {
            return Ok(StateChangeOutcome::Unchanged);
        }

        self.registry.change_state(&current, user).await?;

        let refreshed = self.find(plugin_id, version).await?.ok_or_else(|| {
            AdminError::NotFound(format!(
                "Plugin {}-{} disappeared during state change",
                plugin_id,
                ident::format_version(version)
            ))
        })?;

        Ok(StateChangeOutcome::Updated(PluginSummary::from_metadata(
            refreshed,
        )?))
    }

    /// Delete the plugin version; `true` when a record was removed.
    pub async fn delete_version(
        &self,
        plugin_id: i32,
        version: f64,
        user: &AdminUser,
    ) -> Result<bool, AdminError> {
        self.registry.delete(plugin_id, version, user).await
    }
}
