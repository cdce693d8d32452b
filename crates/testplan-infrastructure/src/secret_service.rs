//! Secret service implementation backed by `secret.json`.

use crate::storage::{SecretStorage, SecretStorageError};
use std::path::Path;
use testplan_core::secret::{SecretConfig, SecretService};

/// Reads credentials from `secret.json` on demand.
///
/// A missing file is not an error: it yields an empty [`SecretConfig`] so the
/// environment-variable fallback can take over.
pub struct SecretServiceImpl {
    storage: SecretStorage,
}

impl SecretServiceImpl {
    /// Uses the default location (~/.config/testplan/secret.json).
    pub fn new() -> Result<Self, SecretStorageError> {
        Ok(Self {
            storage: SecretStorage::new()?,
        })
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            storage: SecretStorage::with_path(path.as_ref().to_path_buf()),
        }
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        match self.storage.load() {
            Ok(config) => Ok(config),
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "no secret file, relying on environment");
                Ok(SecretConfig::default())
            }
            Err(e) => Err(format!(
                "Failed to load {}: {}",
                self.storage.path().display(),
                e
            )),
        }
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let service = SecretServiceImpl::with_path(temp_dir.path().join("secret.json"));

        assert!(!service.secret_file_exists().await);
        assert_eq!(service.load_secrets().await.unwrap(), SecretConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, "not json").unwrap();
        let service = SecretServiceImpl::with_path(&path);

        assert!(service.secret_file_exists().await);
        let err = service.load_secrets().await.unwrap_err();
        assert!(err.contains("secret.json"));
    }
}
