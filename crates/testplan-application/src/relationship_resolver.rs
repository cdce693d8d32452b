//! Parent and linked-issue resolution.
//!
//! Traversal is one level deep: the parent's own parent and links are never read.

use serde_json::Value;
use std::sync::Arc;
use testplan_core::ContextError;
use testplan_core::config::ContextPolicy;
use testplan_core::design::find_design_url;
use testplan_core::enrichment::Enrichment;
use testplan_core::issue::{LinkedIssues, ParentIssue};
use testplan_core::links::classify_links;
use testplan_core::source::{DesignSource, IssueTracker};

pub struct RelationshipResolver {
    tracker: Arc<dyn IssueTracker>,
    design: Arc<dyn DesignSource>,
    policy: ContextPolicy,
}

impl RelationshipResolver {
    pub fn new(tracker: Arc<dyn IssueTracker>, design: Arc<dyn DesignSource>, policy: ContextPolicy) -> Self {
        Self {
            tracker,
            design,
            policy,
        }
    }

    /// Reads the parent issue. Any failure means no parent.
    ///
    /// The returned parent carries no design context yet; see
    /// [`Self::attach_parent_design`].
    pub async fn resolve_parent(&self, parent_key: Option<&str>) -> Option<ParentIssue> {
        let key = parent_key.map(str::trim).filter(|key| !key.is_empty())?;

        match self.tracker.fetch_related_issue(key).await {
            Enrichment::Found(raw) => {
                tracing::debug!(parent_key = key, "parent issue resolved");
                Some(ParentIssue::from_raw(raw, &self.policy))
            }
            Enrichment::Absent => None,
            Enrichment::Failed(err) => {
                log_parent_failure(key, &err);
                None
            }
        }
    }

    /// Resolves the design linked from the parent's description, if any.
    ///
    /// Callers only invoke this when the child issue has no design of its own.
    pub async fn attach_parent_design(&self, parent: &mut ParentIssue) {
        let Some(url) = parent.description.as_deref().and_then(find_design_url) else {
            return;
        };
        parent.design = self.design.fetch_design(&url).await.into_option("parent design");
        if parent.design.is_some() {
            tracing::debug!(parent_key = %parent.key, "using parent design context");
        }
    }

    /// Classifies the raw link list into blocking and causal relationships.
    pub fn resolve_links(&self, links: &[Value]) -> Option<LinkedIssues> {
        let linked = classify_links(links)?;
        tracing::debug!(
            raw = links.len(),
            classified = linked.total(),
            "linked issues resolved"
        );
        Some(linked)
    }
}

fn log_parent_failure(key: &str, err: &ContextError) {
    match err {
        ContextError::NotFound { .. } => {
            tracing::info!(parent_key = key, "parent issue not found")
        }
        ContextError::Auth { status: 403, .. } => {
            tracing::warn!(parent_key = key, "parent issue forbidden; check project permissions")
        }
        ContextError::Auth { status: 401, .. } => {
            tracing::warn!(parent_key = key, "unauthorized reading parent issue")
        }
        other => tracing::warn!(parent_key = key, error = %other, "parent issue unavailable"),
    }
}
