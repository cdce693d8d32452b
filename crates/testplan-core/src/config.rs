//! Process-wide configuration.
//!
//! Built once at startup and threaded through constructors; nothing here is
//! mutated after the aggregation pipeline is assembled.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_FIGMA_API_URL: &str = "https://api.figma.com/v1";

/// Fully resolved configuration handed to every client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira: JiraConfig,
    pub github: Option<GitHubConfig>,
    pub figma: Option<FigmaConfig>,
    pub policy: ContextPolicy,
    pub timeouts: HttpTimeouts,
}

/// Issue tracker credentials. Required.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl JiraConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// Credentials stay out of debug output.
impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"***")
            .finish()
    }
}

/// Code host credentials. Optional; absence disables code-review enrichment.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubConfig {
    pub token: String,
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Design tool credentials. Optional; absence disables design context.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FigmaConfig {
    pub token: String,
    #[serde(default = "default_figma_api_url")]
    pub api_url: String,
}

impl std::fmt::Debug for FigmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FigmaConfig")
            .field("token", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_figma_api_url() -> String {
    DEFAULT_FIGMA_API_URL.to_string()
}

/// Heuristic vocabularies and bounds that shape the aggregated context.
///
/// The keyword lists are hand-tuned and may be overridden from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContextPolicy {
    /// Markers of explicit acceptance criteria in a description.
    pub acceptance_keywords: Vec<String>,
    /// Markers of testing intent in a description.
    pub testing_keywords: Vec<String>,
    /// Markers of testing-related discussion in comments.
    pub comment_keywords: Vec<String>,
    /// Image attachments kept per issue.
    pub max_image_attachments: usize,
    /// Byte ceiling for a single image attachment.
    pub max_attachment_bytes: u64,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self {
            acceptance_keywords: to_strings(&[
                "acceptance criteria",
                "ac:",
                "given",
                "when",
                "then",
                "should:",
                "must:",
            ]),
            testing_keywords: to_strings(&[
                "test", "verify", "validate", "ensure", "check", "expected", "behavior",
            ]),
            comment_keywords: to_strings(&[
                "test",
                "qa",
                "verify",
                "validate",
                "scenario",
                "edge case",
                "regression",
                "acceptance criteria",
                "bug",
                "defect",
                "reproduce",
                "coverage",
                "expected behavior",
                "steps to",
                "repro",
            ]),
            max_image_attachments: 5,
            max_attachment_bytes: 10 * 1024 * 1024,
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Per-call timeouts in seconds, one per external service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpTimeouts {
    pub jira_secs: u64,
    pub dev_status_secs: u64,
    pub github_secs: u64,
    pub figma_secs: u64,
    pub health_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            jira_secs: 20,
            dev_status_secs: 15,
            github_secs: 30,
            figma_secs: 30,
            health_secs: 10,
        }
    }
}

impl HttpTimeouts {
    pub fn jira(&self) -> Duration {
        Duration::from_secs(self.jira_secs)
    }

    pub fn dev_status(&self) -> Duration {
        Duration::from_secs(self.dev_status_secs)
    }

    pub fn github(&self) -> Duration {
        Duration::from_secs(self.github_secs)
    }

    pub fn figma(&self) -> Duration {
        Duration::from_secs(self.figma_secs)
    }

    pub fn health(&self) -> Duration {
        Duration::from_secs(self.health_secs)
    }
}

/// Optional overrides read from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SettingsFile {
    pub policy: ContextPolicy,
    pub timeouts: HttpTimeouts,
}
