//! Unified path management for testplan configuration files.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

/// Locations of the files testplan reads.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/testplan/
/// ├── config.toml              # Policy and timeout overrides
/// └── secret.json              # Service credentials
/// ```
///
/// The layout is the same on every platform so that instructions printed by
/// the CLI hold everywhere.
pub struct TestplanPaths;

impl TestplanPaths {
    /// Returns `~/.config/testplan/`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::home_dir()
            .map(|home| home.join(".config").join("testplan"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the policy file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    /// Keep it readable by the owner only.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
