//! Credential health checks for every configured service.
//!
//! Each check makes one lightweight identity call and folds the outcome into
//! a [`TokenStatus`] with remediation text.

use crate::http::{build_client, from_transport};
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use strum::Display;
use testplan_core::auth::{AuthErrorKind, classify_auth_failure};
use testplan_core::config::{FigmaConfig, GitHubConfig, JiraConfig};

const JIRA_HELP_URL: &str =
    "https://support.atlassian.com/atlassian-account/docs/manage-api-tokens-for-your-atlassian-account/";
const GITHUB_HELP_URL: &str = "https://github.com/settings/tokens";
const FIGMA_HELP_URL: &str = "https://www.figma.com/developers/api#access-tokens";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenState {
    Valid,
    Missing,
    Invalid,
    Expired,
    RateLimited,
    InsufficientPermissions,
    ServiceUnavailable,
}

impl From<AuthErrorKind> for TokenState {
    fn from(kind: AuthErrorKind) -> Self {
        match kind {
            AuthErrorKind::Invalid => Self::Invalid,
            AuthErrorKind::Expired => Self::Expired,
            AuthErrorKind::RateLimited => Self::RateLimited,
            AuthErrorKind::InsufficientPermissions => Self::InsufficientPermissions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenStatus {
    pub service: String,
    pub is_valid: bool,
    pub is_required: bool,
    pub status: TokenState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    /// Account name reported by the service, when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Static facts about one service check.
struct Probe {
    service: &'static str,
    required: bool,
    help_url: &'static str,
    /// Field of the identity response naming the account.
    identity_field: &'static str,
}

const JIRA: Probe = Probe {
    service: "Jira",
    required: true,
    help_url: JIRA_HELP_URL,
    identity_field: "displayName",
};
const GITHUB: Probe = Probe {
    service: "GitHub",
    required: false,
    help_url: GITHUB_HELP_URL,
    identity_field: "login",
};
const FIGMA: Probe = Probe {
    service: "Figma",
    required: false,
    help_url: FIGMA_HELP_URL,
    identity_field: "handle",
};

pub struct TokenHealthService {
    client: Client,
    jira: Option<JiraConfig>,
    github: Option<GitHubConfig>,
    figma: Option<FigmaConfig>,
    timeout: Duration,
}

impl TokenHealthService {
    pub fn new(
        jira: Option<JiraConfig>,
        github: Option<GitHubConfig>,
        figma: Option<FigmaConfig>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: build_client(),
            jira,
            github,
            figma,
            timeout,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub async fn check_jira(&self) -> TokenStatus {
        let request = self.jira.as_ref().map(|jira| {
            self.client
                .get(format!("{}/rest/api/2/myself", jira.base_url()))
                .basic_auth(&jira.email, Some(&jira.api_token))
                .header(ACCEPT, "application/json")
        });
        self.probe(&JIRA, request).await
    }

    pub async fn check_github(&self) -> TokenStatus {
        let request = self.github.as_ref().map(|github| {
            self.client
                .get(format!("{}/user", github.api_url.trim_end_matches('/')))
                .header(AUTHORIZATION, format!("Bearer {}", github.token))
                .header(ACCEPT, "application/vnd.github.v3+json")
        });
        self.probe(&GITHUB, request).await
    }

    pub async fn check_figma(&self) -> TokenStatus {
        let request = self.figma.as_ref().map(|figma| {
            self.client
                .get(format!("{}/me", figma.api_url.trim_end_matches('/')))
                .header("X-FIGMA-TOKEN", &figma.token)
        });
        self.probe(&FIGMA, request).await
    }

    /// Runs every check concurrently, in Jira, GitHub, Figma order.
    pub async fn check_all(&self) -> Vec<TokenStatus> {
        let (jira, github, figma) = tokio::join!(self.check_jira(), self.check_github(), self.check_figma());
        vec![jira, github, figma]
    }

    async fn probe(&self, probe: &Probe, request: Option<RequestBuilder>) -> TokenStatus {
        let Some(request) = request else {
            let message = if probe.required {
                format!("{} credentials are not configured", probe.service)
            } else {
                format!("{} token not configured; this enrichment is disabled", probe.service)
            };
            return status(probe, TokenState::Missing, Some(message), None);
        };

        let response = match request.timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(err) => {
                let err = from_transport(probe.service, &err, self.timeout);
                return status(probe, TokenState::ServiceUnavailable, Some(err.to_string()), None);
            }
        };

        let code = response.status();
        if code.is_success() {
            let identity = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get(probe.identity_field).and_then(Value::as_str).map(str::to_string));
            return status(probe, TokenState::Valid, None, identity);
        }

        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        match classify_auth_failure(code.as_u16(), &body, remaining.as_deref()) {
            Some(kind) => {
                tracing::debug!(service = probe.service, status = code.as_u16(), %kind, "token rejected");
                let message = format!("{}: {}", probe.service, kind.remediation());
                status(probe, kind.into(), Some(message), None)
            }
            None => status(
                probe,
                TokenState::ServiceUnavailable,
                Some(format!("{} returned unexpected status {}", probe.service, code.as_u16())),
                None,
            ),
        }
    }
}

fn status(probe: &Probe, state: TokenState, message: Option<String>, identity: Option<String>) -> TokenStatus {
    TokenStatus {
        service: probe.service.to_string(),
        // A rate-limited token still authenticates.
        is_valid: matches!(state, TokenState::Valid | TokenState::RateLimited),
        is_required: probe.required,
        status: state,
        message,
        help_url: (state != TokenState::Valid).then(|| probe.help_url.to_string()),
        identity,
        checked_at: Utc::now(),
    }
}
