//! Settings file management

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::errors::AdminError;
use crate::logs::LogLevel;

/// Admin daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Administration users
    #[serde(default)]
    pub users: Vec<UserSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            server: ServerSettings::default(),
            users: Vec::new(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file; a missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self, AdminError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Administration user entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub username: String,

    /// Lowercase hex SHA-256 digest of the password
    pub password_sha256: String,

    /// Whether the user holds the admin privilege
    #[serde(default)]
    pub admin: bool,
}
