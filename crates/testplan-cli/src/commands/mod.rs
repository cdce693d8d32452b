pub mod comment;
pub mod fetch;
pub mod health;

use colored::Colorize;
use std::sync::Arc;
use testplan_application::IssueContextUseCase;
use testplan_core::ContextError;
use testplan_core::config::AppConfig;
use testplan_interaction::{DevStatusClient, FigmaClient, GitHubClient, JiraClient};

/// Wires the HTTP clients into the aggregation use case.
pub(crate) fn build_use_case(config: &AppConfig) -> IssueContextUseCase {
    let timeouts = &config.timeouts;
    IssueContextUseCase::new(
        Arc::new(JiraClient::new(config.jira.clone(), timeouts.jira())),
        Arc::new(DevStatusClient::new(config.jira.clone(), timeouts.dev_status())),
        Arc::new(GitHubClient::new(config.github.clone(), timeouts.github())),
        Arc::new(FigmaClient::new(config.figma.clone(), timeouts.figma())),
        config.policy.clone(),
    )
}

/// Prints the error chain and, for known failures, what to do about it.
pub(crate) fn report_error(err: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }

    let hint = err.downcast_ref::<ContextError>().and_then(|context| match context {
        ContextError::Auth { kind, .. } => Some(format!("{}; run `testplan health` for details", kind.remediation())),
        ContextError::NotFound { .. } => {
            Some("check the issue key and that your account can see the project".to_string())
        }
        ContextError::Config(_) => Some(
            "add credentials to ~/.config/testplan/secret.json or set JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN"
                .to_string(),
        ),
        ContextError::Connection { .. } | ContextError::Timeout { .. } => {
            Some("check your network connection and the configured base URL".to_string())
        }
        _ => None,
    });
    if let Some(hint) = hint {
        eprintln!("{} {}", "hint:".yellow().bold(), hint);
    }
}
