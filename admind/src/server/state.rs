//! Server state

use std::sync::Arc;

use crate::assets::AssetDir;
use crate::authn::identity::IdentityProvider;
use crate::deploy::history::HistoryStore;
use crate::deploy::pipeline::DeployPipeline;
use crate::plugins::lifecycle::LifecycleController;

/// Server state shared across handlers
pub struct ServerState {
    pub identity: Arc<dyn IdentityProvider>,
    pub controller: LifecycleController,
    pub pipeline: DeployPipeline,
    pub history: Arc<HistoryStore>,
    pub assets: AssetDir,
}

impl ServerState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        controller: LifecycleController,
        pipeline: DeployPipeline,
        history: Arc<HistoryStore>,
        assets: AssetDir,
    ) -> Self {
        Self {
            identity,
            controller,
            pipeline,
            history,
            assets,
        }
    }
}
