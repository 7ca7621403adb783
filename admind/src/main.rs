//! Pluton Admin Daemon - Entry Point
//!
//! HTTP administration control plane for the Pluton plugin runtime.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use admind::assets::AssetDir;
use admind::authn::identity::SettingsIdentity;
use admind::deploy::history::HistoryStore;
use admind::deploy::pipeline::DeployPipeline;
use admind::logs::{init_logging, LogOptions};
use admind::plugins::lifecycle::LifecycleController;
use admind::plugins::registry::StoreRegistry;
use admind::server::serve::serve;
use admind::server::state::ServerState;
use admind::storage::layout::StorageLayout;
use admind::storage::settings::Settings;
use admind::storage::store::FileStore;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        println!("admind {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    // Resolve the storage layout
    let layout = match cli_args.get("base-dir") {
        Some(dir) => StorageLayout::new(dir),
        None => StorageLayout::default(),
    };
    if let Err(e) = layout.setup().await {
        eprintln!("Unable to prepare the storage layout: {e}");
        return;
    }

    // Retrieve the settings file
    let mut settings = match Settings::load(&layout.settings_file()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            return;
        }
    };
    if let Some(host) = cli_args.get("host") {
        settings.server.host = host.clone();
    }
    if let Some(port) = cli_args.get("port").and_then(|p| p.parse().ok()) {
        settings.server.port = port;
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // Wire the components
    let store = Arc::new(FileStore::new(layout.data_dir()));
    let registry = Arc::new(StoreRegistry::new(store.clone()));
    let history = Arc::new(HistoryStore::new(store));
    let state = Arc::new(ServerState::new(
        Arc::new(SettingsIdentity::new(settings.users.clone())),
        LifecycleController::new(registry),
        DeployPipeline::new(layout.cicd_dir(), history.clone()),
        history,
        AssetDir::new(layout.assets_dir()),
    ));

    info!("Running Pluton admin daemon with settings: {:?}", settings.server);
    let handle = match serve(&settings.server, state, await_shutdown_signal()).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start the admin server: {e}");
            return;
        }
    };

    match handle.await {
        Ok(Ok(())) => info!("Admin server stopped"),
        Ok(Err(e)) => error!("Admin server failed: {e}"),
        Err(e) => error!("Admin server task panicked: {e}"),
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
