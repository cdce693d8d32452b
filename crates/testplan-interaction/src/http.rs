//! HTTP plumbing shared by the service clients.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use testplan_core::auth::classify_auth_failure;
use testplan_core::error::ContextError;

pub const USER_AGENT: &str = concat!("testplan/", env!("CARGO_PKG_VERSION"));

/// Error bodies are cut to this many characters in messages.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Builds the client shared by all requests of one service.
pub fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            Client::new()
        })
}

/// Maps a `reqwest` send/read failure to Connection or Timeout.
pub fn from_transport(service: &str, err: &reqwest::Error, timeout: Duration) -> ContextError {
    if err.is_timeout() {
        ContextError::timeout(service, timeout.as_secs())
    } else {
        ContextError::connection(service, err.to_string())
    }
}

/// Converts a non-success response into a typed error.
///
/// 401/403/429 become [`ContextError::Auth`] with a classified kind. 404
/// becomes NotFound when `entity` names what was requested.
pub async fn error_from_response(
    service: &str,
    entity: Option<(&'static str, &str)>,
    response: Response,
) -> ContextError {
    let status = response.status();
    let rate_limit_remaining = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();

    error_from_parts(service, entity, status, &body, rate_limit_remaining.as_deref())
}

pub fn error_from_parts(
    service: &str,
    entity: Option<(&'static str, &str)>,
    status: StatusCode,
    body: &str,
    rate_limit_remaining: Option<&str>,
) -> ContextError {
    if let Some(kind) = classify_auth_failure(status.as_u16(), body, rate_limit_remaining) {
        return ContextError::auth(service, kind, status.as_u16());
    }
    if status == StatusCode::NOT_FOUND {
        if let Some((entity_type, id)) = entity {
            return ContextError::not_found(entity_type, id);
        }
    }
    ContextError::http(service, status.as_u16(), error_message(body))
}

/// Pulls a readable message out of the JSON error shapes the services use.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("errorMessages")
            .and_then(|m| m.get(0))
            .or_else(|| json.get("message"))
            .or_else(|| json.get("err"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.chars().count() > MAX_ERROR_BODY_CHARS {
        let mut cut: String = message.chars().take(MAX_ERROR_BODY_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        message
    }
}

/// Reads a success response as JSON.
pub async fn read_json(service: &str, response: Response, timeout: Duration) -> Result<Value, ContextError> {
    let body = response
        .text()
        .await
        .map_err(|e| from_transport(service, &e, timeout))?;
    serde_json::from_str(&body).map_err(|e| ContextError::malformed(service, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use testplan_core::auth::AuthErrorKind;

    #[test]
    fn test_auth_statuses_are_classified() {
        let err = error_from_parts("GitHub", None, StatusCode::UNAUTHORIZED, "token expired", None);
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::Expired));

        let err = error_from_parts("GitHub", None, StatusCode::FORBIDDEN, "{}", Some("0"));
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::RateLimited));
    }

    #[test]
    fn test_not_found_needs_an_entity() {
        let err = error_from_parts("Jira", Some(("issue", "SHOP-1")), StatusCode::NOT_FOUND, "", None);
        assert!(err.is_not_found());

        let err = error_from_parts("Jira", None, StatusCode::NOT_FOUND, "", None);
        assert!(matches!(err, ContextError::Http { status: 404, .. }));
    }

    #[test]
    fn test_error_message_extraction() {
        let err = error_from_parts(
            "Jira",
            None,
            StatusCode::BAD_REQUEST,
            r#"{"errorMessages": ["Field 'foo' does not exist"]}"#,
            None,
        );
        assert!(err.to_string().contains("Field 'foo' does not exist"));

        let long = "x".repeat(1000);
        match error_from_parts("Figma", None, StatusCode::BAD_GATEWAY, &long, None) {
            ContextError::Http { message, .. } => assert_eq!(message.chars().count(), MAX_ERROR_BODY_CHARS + 3),
            other => panic!("unexpected {other:?}"),
        }
    }
}
