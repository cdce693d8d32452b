//! File storage for credentials and settings.

mod config_storage;
mod secret_storage;

pub use config_storage::{ConfigStorage, ConfigStorageError};
pub use secret_storage::{SecretStorage, SecretStorageError};
