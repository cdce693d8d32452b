//! Error types for issue context aggregation.

use crate::auth::AuthErrorKind;
use serde::Serialize;
use thiserror::Error;

/// A shared error type for every external source the aggregator talks to.
///
/// Only the primary issue read ever surfaces one of these to the caller.
/// Secondary fetches wrap them in [`crate::enrichment::Enrichment::Failed`]
/// and the orchestrator turns them into absence.
#[derive(Error, Debug, Clone, Serialize)]
pub enum ContextError {
    /// Target entity does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Credential invalid, expired, rate limited or lacking permission
    #[error("{service} authentication failed ({kind}, HTTP {status}): {}", .kind.remediation())]
    Auth {
        service: String,
        kind: AuthErrorKind,
        status: u16,
    },

    /// Transport-level failure (DNS, refused connection, TLS)
    #[error("Failed to reach {service}: {message}")]
    Connection { service: String, message: String },

    /// Per-call timeout expired
    #[error("{service} did not respond within {seconds}s")]
    Timeout { service: String, seconds: u64 },

    /// Unexpected HTTP status
    #[error("{service} returned HTTP {status}: {message}")]
    Http {
        service: String,
        status: u16,
        message: String,
    },

    /// Unexpected payload shape from a source
    #[error("Malformed data from {source_name}: {message}")]
    MalformedData {
        source_name: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContextError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Auth error
    pub fn auth(service: impl Into<String>, kind: AuthErrorKind, status: u16) -> Self {
        Self::Auth {
            service: service.into(),
            kind,
            status,
        }
    }

    /// Creates a Connection error
    pub fn connection(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a Timeout error
    pub fn timeout(service: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            service: service.into(),
            seconds,
        }
    }

    /// Creates an Http error
    pub fn http(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a MalformedData error
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedData {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Connection and timeout failures share the same remediation path.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns the auth classification, if this is an auth failure.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ContextError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for ContextError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedData {
            source_name: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ContextError>`.
pub type Result<T> = std::result::Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_message_contains_remediation() {
        let err = ContextError::auth("GitHub", AuthErrorKind::Expired, 401);
        let message = err.to_string();
        assert!(message.contains("GitHub"));
        assert!(message.contains("expired"));
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::Expired));
    }

    #[test]
    fn test_transport_predicates() {
        assert!(ContextError::timeout("Figma", 30).is_transport());
        assert!(ContextError::connection("Jira", "refused").is_transport());
        assert!(!ContextError::not_found("issue", "ABC-1").is_transport());
        assert!(ContextError::not_found("issue", "ABC-1").is_not_found());
    }
}
