//! Typed outcome of a secondary (best-effort) fetch.

use crate::error::ContextError;

/// Result of one secondary fetch: found, legitimately absent, or failed.
///
/// Every enrichment source (parent issue, development status, code host,
/// design tool, comments) returns this instead of `Result`, so call sites
/// must decide explicitly what absence means. Failures never propagate past
/// the orchestrator; they are logged and dropped via [`Enrichment::into_option`].
#[must_use]
#[derive(Debug, Clone)]
pub enum Enrichment<T> {
    Found(T),
    Absent,
    Failed(ContextError),
}

impl<T> Enrichment<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Enrichment<U> {
        match self {
            Self::Found(value) => Enrichment::Found(f(value)),
            Self::Absent => Enrichment::Absent,
            Self::Failed(err) => Enrichment::Failed(err),
        }
    }

    /// Discards the failure detail without logging.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ContextError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Collapses to `Option`, logging failures at `warn` and absence at `debug`.
    pub fn into_option(self, what: &str) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => {
                tracing::debug!(source = what, "enrichment absent");
                None
            }
            Self::Failed(err) => {
                tracing::warn!(source = what, error = %err, "enrichment failed, continuing without it");
                None
            }
        }
    }
}

impl<T> From<Option<T>> for Enrichment<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::Absent,
        }
    }
}

impl<T> From<crate::error::Result<T>> for Enrichment<T> {
    fn from(value: crate::error::Result<T>) -> Self {
        match value {
            Ok(value) => Self::Found(value),
            Err(err) => Self::Failed(err),
        }
    }
}
