//! Deployment pipeline orchestrator tests

use std::sync::Arc;

use admind::authn::gate::Credentials;
use admind::deploy::history::HistoryStore;
use admind::deploy::model::Deployment;
use admind::deploy::pipeline::DeployPipeline;
use admind::errors::AdminError;
use admind::storage::store::MemoryStore;
use tempfile::TempDir;

fn credentials() -> Credentials {
    Credentials {
        username: "ops".to_string(),
        password: "secret".to_string(),
    }
}

fn request(plugin_id: &str) -> Deployment {
    Deployment {
        repo_url: Some("https://example.com/repo.git".to_string()),
        plugin_id: Some(plugin_id.to_string()),
        ..Deployment::default()
    }
}

/// Write an executable stub that ignores the composed command and prints
/// canned build output.
#[cfg(unix)]
fn stub_build_tool(dir: &TempDir, output: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("stub-build.sh");
    let script = format!("#!/bin/sh\ncat <<'EOF'\n{}\nEOF\n", output);
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.to_str().unwrap().to_string()
}

#[tokio::test]
async fn missing_repo_url_fails_before_touching_the_filesystem() {
    let workspace_root = TempDir::new().unwrap();
    let history = Arc::new(HistoryStore::new(Arc::new(MemoryStore::new())));
    let pipeline = DeployPipeline::new(workspace_root.path(), history.clone());

    let dep = Deployment {
        plugin_id: Some("21".to_string()),
        ..Deployment::default()
    };
    let err = pipeline.deploy(dep, &credentials(), None).await.unwrap_err();

    assert!(matches!(err, AdminError::Validation("repoUrl")));
    assert_eq!(err.to_string(), "Field repoUrl is mandatory");

    let entries = std::fs::read_dir(workspace_root.path()).unwrap().count();
    assert_eq!(entries, 0, "no workspace may be created for an invalid request");
    assert!(history.list().await.unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn successful_run_records_history_and_cleans_the_workspace() {
    let dir = TempDir::new().unwrap();
    let workspace_root = dir.path().join("cicd");
    let history = Arc::new(HistoryStore::new(Arc::new(MemoryStore::new())));
    let shell = stub_build_tool(
        &dir,
        "[INFO] Building myplugin 1.2\n\
         [INFO] Uploaded {myplugin-1.2-jar-with-dependencies.jar} to environment: dev success\n\
         [INFO] Finished at: 2024-03-01T10:00:00Z",
    );
    let pipeline =
        DeployPipeline::new(&workspace_root, history.clone()).with_shell(shell);

    let result = pipeline
        .deploy(request("21"), &credentials(), Some("http://localhost:8080".to_string()))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.name.as_deref(), Some("myplugin"));
    assert_eq!(result.version.as_deref(), Some("1.2"));
    assert_eq!(result.timestamp.as_deref(), Some("2024-03-01T10:00:00Z"));

    // the per-plugin workspace is removed after a recorded run
    assert!(!workspace_root.join("21").exists());

    let records = history.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record_key(), "21_1.2_2024-03-01T10:00:00Z");
}

#[cfg(unix)]
#[tokio::test]
async fn unparseable_build_output_fails_hard_and_leaks_the_workspace() {
    let dir = TempDir::new().unwrap();
    let workspace_root = dir.path().join("cicd");
    let history = Arc::new(HistoryStore::new(Arc::new(MemoryStore::new())));
    let shell = stub_build_tool(&dir, "the build tool said something unexpected");
    let pipeline =
        DeployPipeline::new(&workspace_root, history.clone()).with_shell(shell);

    let err = pipeline
        .deploy(request("21"), &credentials(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Parse(_)));
    // nothing is persisted for a failed parse, and cleanup never ran
    assert!(history.list().await.unwrap().is_empty());
    assert!(workspace_root.join("21").exists());
}
