pub mod config_loader;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_loader::ConfigLoader;
pub use crate::paths::TestplanPaths;
pub use crate::secret_service::SecretServiceImpl;
