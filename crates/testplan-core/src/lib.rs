pub mod adf;
pub mod auth;
pub mod comment_filter;
pub mod config;
pub mod design;
pub mod development;
pub mod enrichment;
pub mod error;
pub mod issue;
pub mod links;
pub mod marker;
pub mod quality;
pub mod resources;
pub mod secret;
pub mod source;

// Re-export common types
pub use auth::AuthErrorKind;
pub use enrichment::Enrichment;
pub use error::{ContextError, Result};
