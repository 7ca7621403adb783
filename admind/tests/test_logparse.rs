//! Build log parser tests

use admind::deploy::logparse::resolve;
use admind::deploy::model::Deployment;
use admind::errors::AdminError;

fn deployment_with_logs(logs: &str) -> Deployment {
    Deployment {
        logs: logs.to_string(),
        ..Deployment::default()
    }
}

#[test]
fn primary_pattern_yields_name_version_and_success() {
    let mut dep = deployment_with_logs(
        "[INFO] Uploading {myplugin-1.2-jar-with-dependencies.jar} to environment: prod success\n\
         [INFO] Finished at: 2024-01-01T00:00:00Z\n",
    );

    resolve(&mut dep).unwrap();

    assert_eq!(dep.name.as_deref(), Some("myplugin"));
    assert_eq!(dep.version.as_deref(), Some("1.2"));
    assert!(dep.success);
    assert_eq!(dep.timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
}

#[test]
fn primary_pattern_failure_state() {
    let mut dep = deployment_with_logs(
        "{myplugin-1.2-jar-with-dependencies.jar} to environment: prod failed\n\
         Finished at: 2024-01-01T00:00:00Z\n",
    );

    resolve(&mut dep).unwrap();

    assert!(!dep.success);
    assert_eq!(dep.name.as_deref(), Some("myplugin"));
}

#[test]
fn fallback_pattern_yields_version_only() {
    let mut dep = deployment_with_logs(
        "[INFO] Building myplugin 1.3\n[INFO] Finished at: 2024-01-01T00:00:00Z\n",
    );

    resolve(&mut dep).unwrap();

    assert_eq!(dep.version.as_deref(), Some("1.3"));
    assert_eq!(dep.name, None);
    assert!(!dep.success);
    assert_eq!(dep.timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
}

#[test]
fn unrecognized_logs_fail_hard() {
    let mut dep = deployment_with_logs("nothing the build tool would ever print\n");
    let err = resolve(&mut dep).unwrap_err();
    assert!(matches!(err, AdminError::Parse(_)));
}

#[test]
fn missing_timestamp_fails_hard() {
    let mut dep = deployment_with_logs("[INFO] Building myplugin 1.3\n");
    let err = resolve(&mut dep).unwrap_err();
    assert!(matches!(err, AdminError::Parse(_)));
    // the derived version is still set; the record is simply never persisted
    assert_eq!(dep.version.as_deref(), Some("1.3"));
}
