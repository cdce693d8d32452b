//! Secret configuration file storage.
//!
//! Loads service credentials from ~/.config/testplan/secret.json.

use crate::paths::TestplanPaths;
use std::fs;
use std::path::{Path, PathBuf};
use testplan_core::secret::SecretConfig;
use thiserror::Error;

/// Failures reading `secret.json`.
#[derive(Debug, Error)]
pub enum SecretStorageError {
    #[error("Secret file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read secret file: {0}")]
    Io(#[from] std::io::Error),
    #[error("secret.json is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not determine home directory")]
    ConfigDirNotFound,
}

/// Read-only storage for `secret.json`.
///
/// Does NOT validate credentials; that is the token health checker's job.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = TestplanPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Every section is optional; a missing file is [`SecretStorageError::NotFound`].
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SecretStorageError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
