//! Classification of authentication failures.
//!
//! Sources report auth problems in different ways (status codes, body text,
//! rate-limit headers). This module folds them into one [`AuthErrorKind`] so
//! the presentation layer can show a single remediation message.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Why a credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuthErrorKind {
    Invalid,
    Expired,
    RateLimited,
    InsufficientPermissions,
}

impl AuthErrorKind {
    /// User-facing remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Invalid => "the token is invalid; check the configured credential",
            Self::Expired => "the token has expired; generate a new one",
            Self::RateLimited => "the API rate limit was exceeded; wait and try again",
            Self::InsufficientPermissions => {
                "the token lacks the required permissions or scopes"
            }
        }
    }

    /// Rate limiting means the token itself is fine.
    pub fn token_is_valid(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Classifies an HTTP response as an auth failure.
///
/// Returns `None` for statuses that are not auth related.
pub fn classify_auth_failure(
    status: u16,
    body: &str,
    rate_limit_remaining: Option<&str>,
) -> Option<AuthErrorKind> {
    let lower = body.to_lowercase();
    match status {
        401 => {
            if lower.contains("expired") {
                Some(AuthErrorKind::Expired)
            } else {
                Some(AuthErrorKind::Invalid)
            }
        }
        403 => {
            let exhausted = rate_limit_remaining.map(str::trim) == Some("0");
            if exhausted || lower.contains("rate limit") {
                Some(AuthErrorKind::RateLimited)
            } else {
                Some(AuthErrorKind::InsufficientPermissions)
            }
        }
        429 => Some(AuthErrorKind::RateLimited),
        _ => None,
    }
}
