use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use testplan_infrastructure::ConfigLoader;
use testplan_interaction::JiraClient;

pub async fn run(key: &str, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("{} is empty", file.display());
    }

    let config = ConfigLoader::new()?.load().await?;
    let client = JiraClient::new(config.jira, config.timeouts.jira());
    let posted = client.post_comment(key, &text).await?;

    let action = if posted.updated { "Updated" } else { "Created" };
    println!("{} test plan comment {} on {}", action.green(), posted.id, key.bold());
    Ok(())
}
