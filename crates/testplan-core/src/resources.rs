//! Merging of child and parent resources for the generation step.
//!
//! The child issue is always preferred; the parent fills gaps.

use crate::design::DesignContext;
use crate::issue::{Attachment, Issue};

/// Images taken from the child before parent images are considered.
pub const CHILD_IMAGE_SHARE: usize = 2;
/// Default total for [`all_images`].
pub const DEFAULT_MAX_IMAGES: usize = 4;
/// Default parent description length for [`combined_description`].
pub const DEFAULT_MAX_PARENT_DESCRIPTION: usize = 1000;

/// The issue's own design context, otherwise its parent's.
pub fn design_context(issue: &Issue) -> Option<&DesignContext> {
    issue
        .development
        .as_ref()
        .and_then(|dev| dev.design.as_ref())
        .or_else(|| issue.parent.as_ref().and_then(|parent| parent.design.as_ref()))
}

/// Up to [`CHILD_IMAGE_SHARE`] child images, then parent images up to `max` in total.
pub fn all_images(issue: &Issue, max: usize) -> Vec<&Attachment> {
    let mut images: Vec<&Attachment> = issue
        .attachments
        .iter()
        .take(CHILD_IMAGE_SHARE.min(max))
        .collect();

    if let Some(parent) = &issue.parent {
        let remaining = max.saturating_sub(images.len());
        images.extend(parent.attachments.iter().take(remaining));
    }
    images
}

/// The issue description followed by a parent section, if there is a parent.
pub fn combined_description(issue: &Issue, max_parent_len: usize) -> String {
    let mut parts = Vec::new();

    if let Some(description) = &issue.description {
        parts.push(format!("## {} Description\n{description}", issue.key));
    }

    if let Some(parent) = &issue.parent {
        parts.push(format!("\n## Parent Context: {} - {}", parent.key, parent.summary));

        if let Some(description) = &parent.description {
            let mut excerpt: String = description.chars().take(max_parent_len).collect();
            if description.chars().count() > max_parent_len {
                excerpt.push_str("...");
            }
            parts.push(format!("\nParent Description:\n{excerpt}"));
        }

        let mut resources = Vec::new();
        if let Some(design) = &parent.design {
            resources.push(format!("Figma design: {}", design.file_name));
        }
        if !parent.attachments.is_empty() {
            resources.push(format!("{} design images", parent.attachments.len()));
        }
        if !resources.is_empty() {
            parts.push(format!("\nParent Resources: {}", resources.join(", ")));
        }
    }

    parts.join("\n")
}

/// True when a parent exists and carries a design context or images.
pub fn should_use_parent_resources(issue: &Issue) -> bool {
    issue
        .parent
        .as_ref()
        .is_some_and(|parent| parent.design.is_some() || !parent.attachments.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextPolicy;
    use crate::development::DevelopmentActivity;
    use crate::issue::ParentIssue;
    use crate::quality::analyze_description;

    fn image(name: &str) -> Attachment {
        Attachment {
            filename: name.to_string(),
            mime_type: "image/png".to_string(),
            size: 10,
            url: format!("https://example.atlassian.net/{name}"),
            thumbnail_url: None,
        }
    }

    fn design(name: &str) -> DesignContext {
        DesignContext {
            file_key: name.to_string(),
            file_name: name.to_string(),
            last_modified: None,
            version: None,
            elements: Vec::new(),
            components: Vec::new(),
        }
    }

    fn issue(attachments: Vec<Attachment>, parent: Option<ParentIssue>) -> Issue {
        Issue {
            key: "SHOP-7".to_string(),
            summary: "Checkout".to_string(),
            raw_description: None,
            description: Some("Child text".to_string()),
            description_analysis: analyze_description("Child text", &ContextPolicy::default()),
            issue_type: "Story".to_string(),
            labels: Vec::new(),
            attachments,
            development: None,
            parent,
            linked_issues: None,
            comments: Vec::new(),
        }
    }

    fn parent(attachments: Vec<Attachment>, design: Option<DesignContext>) -> ParentIssue {
        ParentIssue {
            key: "SHOP-1".to_string(),
            summary: "Checkout epic".to_string(),
            description: Some("x".repeat(20)),
            issue_type: "Epic".to_string(),
            labels: Vec::new(),
            attachments,
            design,
        }
    }

    #[test]
    fn test_child_design_wins_over_parent() {
        let mut child = issue(Vec::new(), Some(parent(Vec::new(), Some(design("parent")))));
        assert_eq!(design_context(&child).map(|d| d.file_name.as_str()), Some("parent"));

        child.development = Some(DevelopmentActivity {
            design: Some(design("child")),
            ..DevelopmentActivity::default()
        });
        assert_eq!(design_context(&child).map(|d| d.file_name.as_str()), Some("child"));
    }

    #[test]
    fn test_images_prefer_child_then_fill_from_parent() {
        let child = issue(
            vec![image("c1"), image("c2"), image("c3")],
            Some(parent(vec![image("p1"), image("p2"), image("p3")], None)),
        );
        let names: Vec<_> = all_images(&child, DEFAULT_MAX_IMAGES)
            .into_iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, vec!["c1", "c2", "p1", "p2"]);

        let lonely = issue(vec![image("c1"), image("c2"), image("c3")], None);
        assert_eq!(all_images(&lonely, DEFAULT_MAX_IMAGES).len(), 2);
    }

    #[test]
    fn test_combined_description_truncates_parent() {
        let child = issue(Vec::new(), Some(parent(vec![image("p1")], Some(design("Flows")))));
        let text = combined_description(&child, 5);
        assert!(text.starts_with("## SHOP-7 Description\nChild text"));
        assert!(text.contains("## Parent Context: SHOP-1 - Checkout epic"));
        assert!(text.contains("Parent Description:\nxxxxx..."));
        assert!(text.contains("Parent Resources: Figma design: Flows, 1 design images"));

        let no_parent = issue(Vec::new(), None);
        assert_eq!(combined_description(&no_parent, 5), "## SHOP-7 Description\nChild text");
    }

    #[test]
    fn test_parent_resource_usage() {
        assert!(!should_use_parent_resources(&issue(Vec::new(), None)));
        assert!(!should_use_parent_resources(&issue(Vec::new(), Some(parent(Vec::new(), None)))));
        assert!(should_use_parent_resources(&issue(
            Vec::new(),
            Some(parent(vec![image("p1")], None))
        )));
    }
}
