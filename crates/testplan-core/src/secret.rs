//! Secret management service trait.
//!
//! Defines the interface for loading credentials for the external services.

use crate::config::{FigmaConfig, GitHubConfig, JiraConfig};
use serde::{Deserialize, Serialize};

/// Credentials as stored in `secret.json`. Every section is optional so a
/// partially filled file still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default)]
    pub jira: Option<JiraConfig>,
    #[serde(default)]
    pub github: Option<GitHubConfig>,
    #[serde(default)]
    pub figma: Option<FigmaConfig>,
}

/// Service for loading secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded secrets
    /// - `Err(String)`: Failed to load (error message should not contain secrets)
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}
