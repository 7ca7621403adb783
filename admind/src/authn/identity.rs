//! Identity provider collaborator

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::AdminError;
use crate::storage::settings::UserSettings;

/// The identity backend's view of an authenticated caller.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub username: String,
    pub admin: bool,
}

/// Narrow interface over the identity backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a caller from Basic-auth credentials.
    async fn authenticate(&self, username: &str, password: &str) -> Result<AdminUser, AdminError>;
}

/// Identity provider backed by the user entries of the settings file.
pub struct SettingsIdentity {
    users: Vec<UserSettings>,
}

impl SettingsIdentity {
    pub fn new(users: Vec<UserSettings>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityProvider for SettingsIdentity {
    async fn authenticate(&self, username: &str, password: &str) -> Result<AdminUser, AdminError> {
        let digest = sha256_hex(password);
        self.users
            .iter()
            .find(|u| u.username == username && u.password_sha256 == digest)
            .map(|u| AdminUser {
                username: u.username.clone(),
                admin: u.admin,
            })
            .ok_or_else(|| {
                AdminError::Authorization(format!("Unknown user or bad credentials: {}", username))
            })
    }
}

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
