use anyhow::Result;
use colored::Colorize;
use testplan_infrastructure::ConfigLoader;
use testplan_interaction::{TokenHealthService, TokenState, TokenStatus};

/// Fails only when a required token is unusable.
pub async fn run() -> Result<()> {
    let loader = ConfigLoader::new()?;
    let credentials = loader.load_credentials().await?;
    let timeouts = loader.load_settings()?.timeouts;
    let service = TokenHealthService::new(
        credentials.jira,
        credentials.github,
        credentials.figma,
        timeouts.health(),
    );

    let statuses = service.check_all().await;
    for status in &statuses {
        print_status(status);
    }

    if statuses.iter().any(|s| s.is_required && !s.is_valid) {
        anyhow::bail!("required credentials are not usable");
    }
    Ok(())
}

fn print_status(status: &TokenStatus) {
    let badge = match status.status {
        TokenState::Valid => "✓".green(),
        TokenState::Missing if !status.is_required => "-".dimmed(),
        TokenState::RateLimited => "~".yellow(),
        _ => "✗".red(),
    };
    let identity = status
        .identity
        .as_deref()
        .map(|who| format!(" as {who}"))
        .unwrap_or_default();
    println!("{badge} {:<8} {}{identity}", status.service, status.status);

    if let Some(message) = &status.message {
        println!("    {message}");
    }
    if let Some(help_url) = &status.help_url {
        println!("    {}", help_url.dimmed());
    }
}
