use anyhow::{Context, Result};
use colored::Colorize;
use testplan_core::issue::Issue;
use testplan_core::resources::{
    DEFAULT_MAX_IMAGES, DEFAULT_MAX_PARENT_DESCRIPTION, all_images, combined_description, design_context,
    should_use_parent_resources,
};
use testplan_infrastructure::ConfigLoader;

pub async fn run(key: &str, json: bool, description: bool) -> Result<()> {
    let config = ConfigLoader::new()?.load().await?;
    let use_case = super::build_use_case(&config);

    let issue = use_case.fetch_issue_context(key).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&issue).context("Failed to serialize issue context")?;
        println!("{rendered}");
    } else {
        print_summary(&issue);
        if description {
            println!();
            println!("{}", combined_description(&issue, DEFAULT_MAX_PARENT_DESCRIPTION));
        }
    }
    Ok(())
}

fn print_summary(issue: &Issue) {
    println!("{} {}", issue.key.bold(), issue.summary);
    println!("  type: {}", issue.issue_type);
    if !issue.labels.is_empty() {
        println!("  labels: {}", issue.labels.join(", "));
    }

    let analysis = &issue.description_analysis;
    if analysis.is_weak {
        println!(
            "  {} description ({} chars, {} words)",
            "weak".yellow(),
            analysis.char_count,
            analysis.word_count
        );
        for warning in &analysis.warnings {
            println!("    {} {warning}", "!".yellow());
        }
    } else {
        println!("  {} description ({} words)", "ok".green(), analysis.word_count);
    }

    if let Some(development) = &issue.development {
        println!(
            "  development: {} commits, {} changes, {} branches",
            development.commits.len(),
            development.code_changes.len(),
            development.branches.len()
        );
        for change in &development.code_changes {
            let stats = change
                .review
                .as_ref()
                .map(|r| format!(" (+{} -{}, {} files)", r.total_additions, r.total_deletions, r.files.len()))
                .unwrap_or_default();
            println!("    - [{}] {}{stats}", change.status, change.title);
        }
        if development.repository_docs.is_some() {
            println!("    repository docs found");
        }
    }

    if let Some(design) = design_context(issue) {
        println!(
            "  design: {} ({} elements, {} components)",
            design.file_name,
            design.elements.len(),
            design.components.len()
        );
    }

    if let Some(parent) = &issue.parent {
        let resources = if should_use_parent_resources(issue) {
            " (design resources used)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  parent: {} {}{resources}", parent.key.bold(), parent.summary);
    }

    if let Some(linked) = &issue.linked_issues {
        for (label, issues) in [
            ("blocks", &linked.blocks),
            ("blocked by", &linked.blocked_by),
            ("causes", &linked.causes),
            ("caused by", &linked.caused_by),
        ] {
            if !issues.is_empty() {
                let keys: Vec<&str> = issues.iter().map(|i| i.key.as_str()).collect();
                println!("  {label}: {}", keys.join(", "));
            }
        }
    }

    let images = all_images(issue, DEFAULT_MAX_IMAGES);
    if !images.is_empty() {
        println!("  images: {}", images.len());
    }

    if !issue.comments.is_empty() {
        println!("  comments:");
        for comment in &issue.comments {
            let first_line = comment.body.lines().next().unwrap_or_default();
            println!("    {}: {first_line}", comment.author.dimmed());
        }
    }
}
