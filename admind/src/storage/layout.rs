//! Storage layout configuration

use std::path::PathBuf;

use tokio::fs;

use crate::errors::AdminError;

/// On-disk layout for the admin daemon
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Get the system store data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Ephemeral build workspaces, one per plugin id
    pub fn cicd_dir(&self) -> PathBuf {
        self.base_dir.join("cicd")
    }

    /// Bundled admin UI assets
    pub fn assets_dir(&self) -> PathBuf {
        self.base_dir.join("ui").join("admin")
    }

    /// Setup the storage layout (create directories)
    pub async fn setup(&self) -> Result<(), AdminError> {
        fs::create_dir_all(self.data_dir()).await?;
        fs::create_dir_all(self.cicd_dir()).await?;
        fs::create_dir_all(self.assets_dir()).await?;
        Ok(())
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        #[cfg(target_os = "linux")]
        let base_dir = PathBuf::from("/etc/pluton");

        #[cfg(not(target_os = "linux"))]
        let base_dir = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pluton");

        Self::new(base_dir)
    }
}
