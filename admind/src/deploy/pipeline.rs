//! Deployment pipeline orchestrator
//!
//! Clones the requested branch into an ephemeral workspace, runs the build
//! tool against it, interprets the captured console output and records the
//! outcome in the deployment history.
//!
//! Known hazards, kept by contract rather than fixed here:
//! - the workspace is keyed by plugin id alone, so two concurrent
//!   deployments of the same plugin id overwrite each other's checkout;
//! - the build invocation has no timeout, a hung tool blocks the request;
//! - a fatal log-parse failure aborts before cleanup and leaks the
//!   workspace directory.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use crate::authn::gate::Credentials;
use crate::deploy::history::HistoryStore;
use crate::deploy::logparse;
use crate::deploy::model::Deployment;
use crate::errors::AdminError;

pub struct DeployPipeline {
    workspace_root: PathBuf,
    history: Arc<HistoryStore>,
    shell: String,
}

impl DeployPipeline {
    pub fn new(workspace_root: impl Into<PathBuf>, history: Arc<HistoryStore>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            history,
            shell: "/bin/sh".to_string(),
        }
    }

    /// Replace the shell the composed build command runs under.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Run the full pipeline for one deployment request and return the
    /// resolved record.
    pub async fn deploy(
        &self,
        mut dep: Deployment,
        credentials: &Credentials,
        callback_url: Option<String>,
    ) -> Result<Deployment, AdminError> {
        if let Some(field) = dep.missing_field() {
            return Err(AdminError::Validation(field));
        }
        let plugin_id = dep.plugin_id.clone().unwrap_or_default();
        let repo_url = dep.repo_url.clone().unwrap_or_default();

        // Workspace keyed by plugin id only; any leftover checkout from a
        // previous run is discarded wholesale.
        let workspace = self.workspace_root.join(&plugin_id);
        match fs::remove_dir_all(&workspace).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&workspace).await?;

        let command = self.build_command(&dep, &repo_url, &plugin_id, &workspace, credentials, callback_url);
        info!(plugin = %plugin_id, repo = %repo_url, "starting deployment build");
        debug!(%command, "composed build command");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&command)
            .output()
            .await?;

        let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));
        dep.logs = logs;

        logparse::resolve(&mut dep)?;
        self.history.append(&dep).await?;

        fs::remove_dir_all(&workspace).await?;
        info!(plugin = %plugin_id, success = dep.success, "deployment recorded");
        Ok(dep)
    }

    fn build_command(
        &self,
        dep: &Deployment,
        repo_url: &str,
        plugin_id: &str,
        workspace: &std::path::Path,
        credentials: &Credentials,
        callback_url: Option<String>,
    ) -> String {
        let branch = dep
            .branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or("master");
        let sub_dir = dep
            .sub_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| format!("/{}", d))
            .unwrap_or_default();
        let skip_tests = if dep.skip_tests { " -DskipTests" } else { "" };
        let endpoint = callback_url
            .map(|url| format!(" -Dpluton.endpoint={}", url))
            .unwrap_or_default();
        let ws = workspace.display();

        format!(
            "git clone --single-branch --branch {branch} {repo_url} {ws} ; \
             mvn deploy -f {ws}{sub_dir}/pom.xml{skip_tests} \
             -Dpluton.username={username} -Dpluton.password={password} \
             -Dpluton.id={plugin_id}{endpoint}",
            username = credentials.username,
            password = credentials.password,
        )
    }
}
