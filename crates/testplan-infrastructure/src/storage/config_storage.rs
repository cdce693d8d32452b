//! Storage for `config.toml` (policy and timeout overrides).

use std::fs;
use std::path::PathBuf;
use testplan_core::config::SettingsFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigStorageError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Read-only handle on the settings file.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the settings file.
    ///
    /// A missing or empty file yields the defaults; omitted keys keep their
    /// default values.
    pub fn load(&self) -> Result<SettingsFile, ConfigStorageError> {
        if !self.path.exists() {
            return Ok(SettingsFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SettingsFile::default());
        }

        Ok(toml::from_str(&content)?)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
