//! Persistent storage: system store backends, layout and settings

pub mod layout;
pub mod settings;
pub mod store;
