//! Pluton Admin Daemon Library
//!
//! Administrative control plane for the Pluton plugin runtime: plugin
//! listing, enable/disable lifecycle transitions, plugin-version deletion,
//! the git-to-build deployment pipeline and its history.

pub mod assets;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod plugins;
pub mod server;
pub mod storage;
