//! Issue context aggregation use case.
//!
//! `IssueContextUseCase` is the single entry point that turns an issue key into
//! a composed [`Issue`]. It reads the primary issue, then runs every secondary
//! enrichment concurrently and merges the results once they have all settled.
//!
//! # Failure policy
//!
//! Only the primary issue read can fail the request. Development activity,
//! design context, the parent issue and comments degrade to absence; each
//! failure is logged where it is dropped.

use crate::development_activity::DevelopmentActivityResolver;
use crate::relationship_resolver::RelationshipResolver;
use std::sync::Arc;
use testplan_core::comment_filter::filter_comments;
use testplan_core::config::ContextPolicy;
use testplan_core::design::{DesignContext, find_design_url};
use testplan_core::development::DevelopmentActivity;
use testplan_core::error::Result;
use testplan_core::issue::{Issue, select_image_attachments};
use testplan_core::quality::analyze_description;
use testplan_core::source::{CodeHost, DesignSource, DevelopmentStatusSource, IssueTracker};

pub struct IssueContextUseCase {
    tracker: Arc<dyn IssueTracker>,
    design: Arc<dyn DesignSource>,
    development: DevelopmentActivityResolver,
    relationships: RelationshipResolver,
    policy: ContextPolicy,
}

impl IssueContextUseCase {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        status: Arc<dyn DevelopmentStatusSource>,
        code_host: Arc<dyn CodeHost>,
        design: Arc<dyn DesignSource>,
        policy: ContextPolicy,
    ) -> Self {
        Self {
            development: DevelopmentActivityResolver::new(status, code_host),
            relationships: RelationshipResolver::new(tracker.clone(), design.clone(), policy.clone()),
            tracker,
            design,
            policy,
        }
    }

    /// Aggregates the full context for `key`.
    ///
    /// # Errors
    ///
    /// Returns the primary read's error (not found, auth, transport). No
    /// secondary source can produce an error here.
    pub async fn fetch_issue_context(&self, key: &str) -> Result<Issue> {
        let raw = self.tracker.fetch_issue(key).await?;
        tracing::info!(issue_key = %raw.key, "primary issue fetched");

        let description = raw.description_text();
        let analysis = analyze_description(&description, &self.policy);
        if analysis.is_weak {
            tracing::warn!(
                issue_key = %raw.key,
                warnings = analysis.warnings.len(),
                "issue description is weak"
            );
        }

        let design_url = find_design_url(&description);
        let child_design = async {
            match &design_url {
                Some(url) => self.design.fetch_design(url).await.into_option("design"),
                None => None,
            }
        };

        let (development, child_design, parent, comments) = tokio::join!(
            self.development.resolve(&raw.id),
            child_design,
            self.relationships.resolve_parent(raw.parent_key.as_deref()),
            self.tracker.fetch_comments(&raw.key),
        );

        let mut parent = parent;
        if child_design.is_none() {
            if let Some(parent) = parent.as_mut() {
                self.relationships.attach_parent_design(parent).await;
            }
        }

        let development = merge_design(development, child_design);
        let linked_issues = self.relationships.resolve_links(&raw.links);
        let comments = comments
            .into_option("comments")
            .map(|raw_comments| filter_comments(&raw_comments, &self.policy))
            .unwrap_or_default();

        let issue = Issue {
            attachments: select_image_attachments(&raw.attachments, &self.policy),
            key: raw.key,
            summary: raw.summary,
            raw_description: raw.description,
            description: Some(description).filter(|text| !text.is_empty()),
            description_analysis: analysis,
            issue_type: raw.issue_type,
            labels: raw.labels,
            development,
            parent,
            linked_issues,
            comments,
        };

        tracing::info!(
            issue_key = %issue.key,
            development = issue.development.is_some(),
            parent = issue.parent.is_some(),
            linked = issue.linked_issues.as_ref().map_or(0, |l| l.total()),
            comments = issue.comments.len(),
            "issue context aggregated"
        );
        Ok(issue)
    }
}

/// Attaches the child's design to the activity, creating an empty shell when
/// design is the only development-side context.
fn merge_design(
    development: Option<DevelopmentActivity>,
    design: Option<DesignContext>,
) -> Option<DevelopmentActivity> {
    match (development, design) {
        (Some(mut activity), design) => {
            activity.design = design;
            Some(activity)
        }
        (None, Some(design)) => Some(DevelopmentActivity {
            design: Some(design),
            ..Default::default()
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design() -> DesignContext {
        DesignContext {
            file_key: "AbC123".to_string(),
            file_name: "Checkout".to_string(),
            last_modified: None,
            version: None,
            elements: Vec::new(),
            components: Vec::new(),
        }
    }

    #[test]
    fn test_merge_design() {
        assert_eq!(merge_design(None, None), None);

        let shell = merge_design(None, Some(design())).expect("shell");
        assert!(shell.has_no_work());
        assert_eq!(shell.design.unwrap().file_key, "AbC123");

        let activity = DevelopmentActivity {
            branches: vec!["main".to_string()],
            ..Default::default()
        };
        let merged = merge_design(Some(activity), None).expect("activity");
        assert_eq!(merged.branches, vec!["main"]);
        assert!(merged.design.is_none());
    }
}
