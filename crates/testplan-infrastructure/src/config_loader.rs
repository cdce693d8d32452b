//! Assembles [`AppConfig`] from `secret.json`, `config.toml` and the environment.
//!
//! Credential sources, highest priority first: the secret file, then
//! `JIRA_BASE_URL` / `JIRA_EMAIL` / `JIRA_API_TOKEN`, `GITHUB_TOKEN` and
//! `FIGMA_TOKEN`.

use crate::paths::TestplanPaths;
use crate::secret_service::SecretServiceImpl;
use crate::storage::ConfigStorage;
use std::sync::Arc;
use testplan_core::config::{
    AppConfig, DEFAULT_FIGMA_API_URL, DEFAULT_GITHUB_API_URL, FigmaConfig, GitHubConfig, JiraConfig,
    SettingsFile,
};
use testplan_core::error::{ContextError, Result};
use testplan_core::secret::{SecretConfig, SecretService};

pub const ENV_JIRA_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_JIRA_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_FIGMA_TOKEN: &str = "FIGMA_TOKEN";

/// Loads the process configuration once at startup.
pub struct ConfigLoader {
    secrets: Arc<dyn SecretService>,
    settings: ConfigStorage,
}

impl ConfigLoader {
    /// Uses the default file locations under ~/.config/testplan/.
    pub fn new() -> Result<Self> {
        let secrets = SecretServiceImpl::new().map_err(|e| ContextError::config(e.to_string()))?;
        let settings_path =
            TestplanPaths::config_file().map_err(|e| ContextError::config(e.to_string()))?;
        Ok(Self::with_sources(
            Arc::new(secrets),
            ConfigStorage::new(settings_path),
        ))
    }

    pub fn with_sources(secrets: Arc<dyn SecretService>, settings: ConfigStorage) -> Self {
        Self { secrets, settings }
    }

    /// Loads using the real process environment.
    pub async fn load(&self) -> Result<AppConfig> {
        self.load_with_env(|name| std::env::var(name).ok()).await
    }

    /// Loads using `env` for the variable fallback.
    pub async fn load_with_env<F>(&self, env: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets = self.secrets.load_secrets().await.map_err(ContextError::config)?;
        let settings = self.load_settings()?;
        resolve(secrets, settings, env)
    }

    /// Policy and timeout overrides from `config.toml`, defaults when absent.
    pub fn load_settings(&self) -> Result<SettingsFile> {
        self.settings
            .load()
            .map_err(|e| ContextError::config(format!("{}: {}", self.settings.path().display(), e)))
    }

    /// Credentials only, without failing when the issue tracker is unconfigured.
    pub async fn load_credentials(&self) -> Result<Credentials> {
        let secrets = self.secrets.load_secrets().await.map_err(ContextError::config)?;
        Ok(resolve_credentials(secrets, |name| std::env::var(name).ok()))
    }
}

/// Credentials after applying the environment fallback. Any may be missing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub jira: Option<JiraConfig>,
    pub github: Option<GitHubConfig>,
    pub figma: Option<FigmaConfig>,
}

/// Merges the sources; missing issue tracker credentials are fatal.
pub fn resolve<F>(secrets: SecretConfig, settings: SettingsFile, env: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = resolve_credentials(secrets, env);
    let jira = credentials.jira.ok_or_else(missing_jira)?;

    if credentials.github.is_none() {
        tracing::info!("GitHub token not configured, code review enrichment disabled");
    }
    if credentials.figma.is_none() {
        tracing::info!("Figma token not configured, design context disabled");
    }

    Ok(AppConfig {
        jira,
        github: credentials.github,
        figma: credentials.figma,
        policy: settings.policy,
        timeouts: settings.timeouts,
    })
}

/// Picks each service's credentials from the secret file, else the environment.
pub fn resolve_credentials<F>(secrets: SecretConfig, env: F) -> Credentials
where
    F: Fn(&str) -> Option<String>,
{
    let env = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let jira = secrets.jira.filter(jira_is_complete).or_else(|| {
        Some(JiraConfig {
            base_url: env(ENV_JIRA_BASE_URL)?,
            email: env(ENV_JIRA_EMAIL)?,
            api_token: env(ENV_JIRA_API_TOKEN)?,
        })
    });

    let github = secrets
        .github
        .filter(|github| !github.token.trim().is_empty())
        .or_else(|| {
            env(ENV_GITHUB_TOKEN).map(|token| GitHubConfig {
                token,
                api_url: DEFAULT_GITHUB_API_URL.to_string(),
            })
        });

    let figma = secrets
        .figma
        .filter(|figma| !figma.token.trim().is_empty())
        .or_else(|| {
            env(ENV_FIGMA_TOKEN).map(|token| FigmaConfig {
                token,
                api_url: DEFAULT_FIGMA_API_URL.to_string(),
            })
        });

    Credentials { jira, github, figma }
}

fn jira_is_complete(jira: &JiraConfig) -> bool {
    [&jira.base_url, &jira.email, &jira.api_token]
        .iter()
        .all(|value| !value.trim().is_empty())
}

fn missing_jira() -> ContextError {
    ContextError::config(format!(
        "Jira credentials missing: add a \"jira\" section to secret.json or set \
         {ENV_JIRA_BASE_URL}, {ENV_JIRA_EMAIL} and {ENV_JIRA_API_TOKEN}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use testplan_core::config::HttpTimeouts;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn jira_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_JIRA_BASE_URL, "https://env.atlassian.net"),
            (ENV_JIRA_EMAIL, "env@acme.test"),
            (ENV_JIRA_API_TOKEN, "env-token"),
        ]
    }

    #[test]
    fn test_secret_file_wins_over_environment() {
        let secrets = SecretConfig {
            jira: Some(JiraConfig {
                base_url: "https://file.atlassian.net".into(),
                email: "file@acme.test".into(),
                api_token: "file-token".into(),
            }),
            github: Some(GitHubConfig {
                token: "file-gh".into(),
                api_url: "http://127.0.0.1:9".into(),
            }),
            figma: None,
        };
        let mut vars = jira_env();
        vars.push((ENV_GITHUB_TOKEN, "env-gh"));
        vars.push((ENV_FIGMA_TOKEN, "env-figma"));

        let config = resolve(secrets, SettingsFile::default(), env_of(&vars)).unwrap();
        assert_eq!(config.jira.email, "file@acme.test");
        let github = config.github.unwrap();
        assert_eq!(github.token, "file-gh");
        assert_eq!(github.api_url, "http://127.0.0.1:9");
        assert_eq!(config.figma.unwrap().token, "env-figma");
    }

    #[test]
    fn test_environment_fallback() {
        let config = resolve(SecretConfig::default(), SettingsFile::default(), env_of(&jira_env())).unwrap();
        assert_eq!(config.jira.base_url, "https://env.atlassian.net");
        assert!(config.github.is_none());
        assert!(config.figma.is_none());
    }

    #[test]
    fn test_incomplete_secret_section_falls_back() {
        let secrets = SecretConfig {
            jira: Some(JiraConfig {
                base_url: "https://file.atlassian.net".into(),
                email: "".into(),
                api_token: "file-token".into(),
            }),
            ..SecretConfig::default()
        };
        let config = resolve(secrets, SettingsFile::default(), env_of(&jira_env())).unwrap();
        assert_eq!(config.jira.email, "env@acme.test");
    }

    #[test]
    fn test_missing_jira_is_config_error() {
        let err = resolve(
            SecretConfig::default(),
            SettingsFile::default(),
            env_of(&[(ENV_JIRA_BASE_URL, "https://env.atlassian.net"), (ENV_JIRA_EMAIL, "  ")]),
        )
        .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(ENV_JIRA_API_TOKEN));
    }

    #[test]
    fn test_credentials_may_all_be_missing() {
        let credentials = resolve_credentials(SecretConfig::default(), env_of(&[(ENV_FIGMA_TOKEN, "f")]));
        assert!(credentials.jira.is_none());
        assert!(credentials.github.is_none());
        assert_eq!(credentials.figma.unwrap().api_url, DEFAULT_FIGMA_API_URL);
    }

    #[tokio::test]
    async fn test_loader_reads_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let secret_path = temp_dir.path().join("secret.json");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &secret_path,
            r#"{"jira": {"base_url": "https://acme.atlassian.net/", "email": "qa@acme.test", "api_token": "t"}}"#,
        )
        .unwrap();
        std::fs::write(&config_path, "[timeouts]\njira_secs = 7\n").unwrap();

        let loader = ConfigLoader::with_sources(
            Arc::new(SecretServiceImpl::with_path(&secret_path)),
            ConfigStorage::new(config_path),
        );
        let config = loader.load_with_env(|_| None).await.unwrap();
        assert_eq!(config.jira.base_url(), "https://acme.atlassian.net");
        assert_eq!(config.timeouts.jira_secs, 7);
    }

    #[test]
    fn test_settings_load_without_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[timeouts]\nhealth_secs = 3\n").unwrap();

        let loader = ConfigLoader::with_sources(
            Arc::new(SecretServiceImpl::with_path(temp_dir.path().join("secret.json"))),
            ConfigStorage::new(config_path),
        );
        let settings = loader.load_settings().unwrap();
        assert_eq!(settings.timeouts.health(), std::time::Duration::from_secs(3));
        assert_eq!(settings.timeouts.jira_secs, HttpTimeouts::default().jira_secs);
    }
}
