//! Seams to the external services the aggregator reads from.
//!
//! Implementations live in `testplan-interaction`; the application layer only
//! sees these traits, which keeps the orchestrator testable with in-memory
//! fakes.

use crate::design::DesignContext;
use crate::development::{CodeReviewDetails, DevDataType, RepositoryDocumentation, ReviewFetchOptions};
use crate::enrichment::Enrichment;
use crate::error::Result;
use crate::issue::{RawComment, RawIssue};
use async_trait::async_trait;
use serde_json::Value;

/// Issue tracker reads.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Primary issue read. The only fetch whose failure reaches the caller.
    async fn fetch_issue(&self, key: &str) -> Result<RawIssue>;

    /// Same read for a related (parent) issue, with failures softened.
    async fn fetch_related_issue(&self, key: &str) -> Enrichment<RawIssue>;

    /// All comments on the issue, oldest first.
    async fn fetch_comments(&self, key: &str) -> Enrichment<Vec<RawComment>>;
}

/// The tracker's unofficial development-status API.
///
/// `Ok(None)` means the endpoint answered with a non-success status; `Err` is
/// reserved for transport failures, which abort development resolution.
#[async_trait]
pub trait DevelopmentStatusSource: Send + Sync {
    async fn fetch_summary(&self, issue_id: &str) -> Result<Option<Value>>;

    async fn fetch_detail(
        &self,
        issue_id: &str,
        application_type: &str,
        data_type: DevDataType,
    ) -> Result<Option<Value>>;
}

/// Code-review host (pull requests, repository contents).
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// True if `url` points at a change this host can enrich.
    fn is_supported_url(&self, url: &str) -> bool;

    async fn fetch_change(&self, url: &str, options: ReviewFetchOptions) -> Enrichment<CodeReviewDetails>;

    /// Primer documentation and example test paths for the change's repository.
    async fn fetch_repository_docs(&self, url: &str) -> Enrichment<RepositoryDocumentation>;
}

/// Design tool.
#[async_trait]
pub trait DesignSource: Send + Sync {
    async fn fetch_design(&self, url: &str) -> Enrichment<DesignContext>;
}
