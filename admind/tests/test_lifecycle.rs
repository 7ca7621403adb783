//! Lifecycle controller and listing tests

use std::sync::Arc;

use admind::authn::identity::AdminUser;
use admind::errors::AdminError;
use admind::plugins::lifecycle::{LifecycleController, StateChange, StateChangeOutcome};
use admind::plugins::registry::{PluginMetadata, StoreRegistry};
use admind::storage::store::MemoryStore;

fn admin() -> AdminUser {
    AdminUser {
        username: "ops".to_string(),
        admin: true,
    }
}

async fn controller_with(keys: &[&str]) -> (LifecycleController, Arc<StoreRegistry>) {
    let registry = Arc::new(StoreRegistry::new(Arc::new(MemoryStore::new())));
    for key in keys {
        registry
            .put(&PluginMetadata {
                id: key.to_string(),
                enabled: false,
                last_modified: None,
            })
            .await
            .unwrap();
    }
    (LifecycleController::new(registry.clone()), registry)
}

#[tokio::test]
async fn listing_sorts_by_id_then_version_as_string() {
    let (controller, _) = controller_with(&[
        "beta-2-1.0",
        "alpha-1-2.0",
        "alpha-1-1.0",
        "alpha-1-10.0",
    ])
    .await;

    let summaries = controller.list_plugins().await.unwrap();
    let order: Vec<(i32, String)> = summaries
        .iter()
        .map(|s| (s.plugin_info.id, s.plugin_info.version.clone()))
        .collect();

    // String comparison of versions: "10.0" sorts before "2.0".
    assert_eq!(
        order,
        vec![
            (1, "1.0".to_string()),
            (1, "10.0".to_string()),
            (1, "2.0".to_string()),
            (2, "1.0".to_string()),
        ]
    );
}

#[tokio::test]
async fn change_state_mutates_then_rereads() {
    let (controller, _) = controller_with(&["alpha-1-1.0"]).await;

    let outcome = controller
        .change_state(1, 1.0, &StateChange { enabled: true }, &admin())
        .await
        .unwrap();

    match outcome {
        StateChangeOutcome::Updated(summary) => {
            assert!(summary.metadata.enabled);
            assert!(summary.metadata.last_modified.is_some());
            assert_eq!(summary.plugin_info.name, "alpha");
        }
        StateChangeOutcome::Unchanged => panic!("expected a mutation"),
    }
}

#[tokio::test]
async fn change_state_is_idempotent_after_convergence() {
    let (controller, _) = controller_with(&["alpha-1-1.0"]).await;
    let desired = StateChange { enabled: true };

    let first = controller
        .change_state(1, 1.0, &desired, &admin())
        .await
        .unwrap();
    assert!(matches!(first, StateChangeOutcome::Updated(_)));

    let second = controller
        .change_state(1, 1.0, &desired, &admin())
        .await
        .unwrap();
    assert!(matches!(second, StateChangeOutcome::Unchanged));
}

#[tokio::test]
async fn change_state_on_unknown_plugin_is_not_found() {
    let (controller, registry) = controller_with(&["alpha-1-1.0"]).await;

    let err = controller
        .change_state(9, 1.0, &StateChange { enabled: true }, &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::NotFound(_)));

    // no mutation happened
    use admind::plugins::registry::PluginRegistry;
    let records = registry.list_metadata().await.unwrap();
    assert!(records.iter().all(|m| !m.enabled));
}

#[tokio::test]
async fn delete_version_reports_removal() {
    let (controller, _) = controller_with(&["alpha-1-1.0"]).await;

    assert!(controller.delete_version(1, 1.0, &admin()).await.unwrap());
    assert!(!controller.delete_version(1, 1.0, &admin()).await.unwrap());
}
