//! Development-activity resolution.
//!
//! Reads the tracker's development-status API, fans out per integration
//! type, and enriches each discovered change through the code host.

use futures::future::{join_all, try_join_all};
use serde_json::Value;
use std::sync::Arc;
use testplan_core::development::{
    DevDataType, DevelopmentActivity, ReviewFetchOptions, application_types, parse_detail,
};
use testplan_core::enrichment::Enrichment;
use testplan_core::error::Result;
use testplan_core::source::{CodeHost, DevelopmentStatusSource};

/// Best-effort resolver: every failure collapses into `None`.
pub struct DevelopmentActivityResolver {
    status: Arc<dyn DevelopmentStatusSource>,
    code_host: Arc<dyn CodeHost>,
}

impl DevelopmentActivityResolver {
    pub fn new(status: Arc<dyn DevelopmentStatusSource>, code_host: Arc<dyn CodeHost>) -> Self {
        Self { status, code_host }
    }

    /// Resolves the activity linked to `issue_id` (the tracker's internal id).
    ///
    /// Returns `None` when the API is unavailable, a transport error occurs
    /// while reading it, or no commits, changes or branches exist.
    pub async fn resolve(&self, issue_id: &str) -> Option<DevelopmentActivity> {
        let summary = match self.status.fetch_summary(issue_id).await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                tracing::debug!(issue_id, "development status unavailable");
                return None;
            }
            Err(err) => {
                tracing::warn!(issue_id, error = %err, "development status lookup failed");
                return None;
            }
        };

        let types = application_types(&summary);
        if types.is_empty() {
            tracing::debug!(issue_id, "no development integrations linked");
            return None;
        }

        let details = match self.fetch_details(issue_id, &types).await {
            Ok(details) => details,
            Err(err) => {
                tracing::warn!(issue_id, error = %err, "development detail lookup failed");
                return None;
            }
        };

        let mut activity = DevelopmentActivity::default();
        for payload in details.iter().flatten() {
            activity.absorb(parse_detail(payload));
        }
        if activity.has_no_work() {
            tracing::debug!(issue_id, "development status reported no work");
            return None;
        }

        self.enrich_changes(&mut activity).await;
        self.attach_repository_docs(&mut activity).await;

        tracing::info!(
            issue_id,
            commits = activity.commits.len(),
            changes = activity.code_changes.len(),
            branches = activity.branches.len(),
            "development activity resolved"
        );
        Some(activity)
    }

    /// Repository and pull-request details for every type, in type order.
    async fn fetch_details(&self, issue_id: &str, types: &[String]) -> Result<Vec<Option<Value>>> {
        let per_type = try_join_all(types.iter().map(|application_type| async move {
            let (repository, pull_requests) = tokio::try_join!(
                self.status
                    .fetch_detail(issue_id, application_type, DevDataType::Repository),
                self.status
                    .fetch_detail(issue_id, application_type, DevDataType::PullRequest),
            )?;
            Ok::<_, testplan_core::ContextError>([repository, pull_requests])
        }))
        .await?;

        Ok(per_type.into_iter().flatten().collect())
    }

    async fn enrich_changes(&self, activity: &mut DevelopmentActivity) {
        let supported: Vec<(usize, String)> = activity
            .code_changes
            .iter()
            .enumerate()
            .filter_map(|(index, change)| {
                change
                    .url
                    .as_ref()
                    .filter(|url| self.code_host.is_supported_url(url))
                    .map(|url| (index, url.clone()))
            })
            .collect();

        let reviews = join_all(supported.iter().map(|(_, url)| {
            self.code_host.fetch_change(url, ReviewFetchOptions::default())
        }))
        .await;

        for ((index, url), review) in supported.into_iter().zip(reviews) {
            if let Enrichment::Failed(err) = &review {
                tracing::warn!(url = %url, error = %err, "code change enrichment failed");
            }
            activity.code_changes[index].review = review.found();
        }
    }

    /// First successful repository documentation fetch across supported changes.
    async fn attach_repository_docs(&self, activity: &mut DevelopmentActivity) {
        let urls: Vec<String> = activity
            .code_changes
            .iter()
            .filter_map(|change| change.url.clone())
            .filter(|url| self.code_host.is_supported_url(url))
            .collect();

        for url in urls {
            match self.code_host.fetch_repository_docs(&url).await {
                Enrichment::Found(docs) => {
                    activity.repository_docs = Some(docs);
                    return;
                }
                Enrichment::Absent => tracing::debug!(url = %url, "no repository documentation"),
                Enrichment::Failed(err) => {
                    tracing::warn!(url = %url, error = %err, "repository documentation unavailable")
                }
            }
        }
    }
}
