//! Issue tracker REST client (Jira Cloud, API v3).
//!
//! Reads issues and comments, and writes the single system-authored comment.

use crate::http::{build_client, error_from_response, from_transport, read_json};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use testplan_core::adf;
use testplan_core::config::JiraConfig;
use testplan_core::enrichment::Enrichment;
use testplan_core::error::{ContextError, Result};
use testplan_core::issue::{ISSUE_FIELDS, RawComment, RawIssue, parse_comment_page};
use testplan_core::marker::{SYSTEM_COMMENT_MARKER, SystemCommentMarker};
use testplan_core::source::IssueTracker;

const SERVICE: &str = "Jira";
const COMMENT_PAGE_SIZE: u32 = 100;
/// Upper bound on comment pages read for one issue.
const MAX_COMMENT_PAGES: usize = 50;

/// Outcome of [`JiraClient::post_comment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedComment {
    pub id: String,
    /// True if an existing system comment was replaced.
    pub updated: bool,
}

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraConfig,
    timeout: Duration,
    marker: SystemCommentMarker,
}

impl JiraClient {
    pub fn new(config: JiraConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            config,
            timeout,
            marker: SystemCommentMarker,
        }
    }

    /// Shares an existing connection pool.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
    }

    async fn read_issue(&self, key: &str) -> Result<RawIssue> {
        let url = self.url(&format!("/rest/api/3/issue/{key}"));
        tracing::debug!(issue_key = key, "reading issue");

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("fields", ISSUE_FIELDS)])
            .send()
            .await
            .map_err(|e| from_transport(SERVICE, &e, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, Some(("issue", key)), response).await);
        }
        let payload = read_json(SERVICE, response, self.timeout).await?;
        RawIssue::from_json(&payload)
    }

    /// Every comment on the issue, oldest first, following `startAt` paging.
    async fn list_comments(&self, key: &str) -> Result<Vec<RawComment>> {
        let mut comments = Vec::new();
        for page in 0..MAX_COMMENT_PAGES {
            let payload = self.comment_page(key, comments.len()).await?;
            let batch = parse_comment_page(&payload);
            let fetched = batch.len();
            comments.extend(batch);

            let exhausted = match payload.get("total").and_then(Value::as_u64) {
                Some(total) => comments.len() as u64 >= total,
                None => fetched < COMMENT_PAGE_SIZE as usize,
            };
            if fetched == 0 || exhausted {
                tracing::debug!(issue_key = key, comments = comments.len(), pages = page + 1, "comments listed");
                return Ok(comments);
            }
        }
        tracing::warn!(issue_key = key, comments = comments.len(), "comment paging limit reached");
        Ok(comments)
    }

    async fn comment_page(&self, key: &str, start_at: usize) -> Result<Value> {
        let url = self.url(&format!("/rest/api/3/issue/{key}/comment"));
        let response = self
            .authorized(self.client.get(&url))
            .query(&[
                ("orderBy", "created".to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", COMMENT_PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| from_transport(SERVICE, &e, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, Some(("issue", key)), response).await);
        }
        read_json(SERVICE, response, self.timeout).await
    }

    /// Posts `text` as the system comment, replacing a previous one if present.
    ///
    /// The marker is prepended unless `text` already starts with it. A failed
    /// comment listing falls back to creating a new comment.
    pub async fn post_comment(&self, key: &str, text: &str) -> Result<PostedComment> {
        let body = if text.starts_with(SYSTEM_COMMENT_MARKER) {
            text.to_string()
        } else {
            self.marker.mark(text)
        };
        let document = json!({ "body": adf::paragraph_document(&body) });

        let existing = match self.list_comments(key).await {
            Ok(comments) => comments
                .into_iter()
                .find(|c| c.id.is_some() && self.marker.is_marked(&adf::plain_text(&c.body)))
                .and_then(|c| c.id),
            Err(err) => {
                tracing::warn!(issue_key = key, error = %err, "could not list comments, creating a new one");
                None
            }
        };

        let (request, updated) = match &existing {
            Some(id) => {
                tracing::info!(issue_key = key, comment_id = %id, "updating system comment");
                let url = self.url(&format!("/rest/api/3/issue/{key}/comment/{id}"));
                (self.client.put(url), true)
            }
            None => {
                tracing::info!(issue_key = key, "creating system comment");
                let url = self.url(&format!("/rest/api/3/issue/{key}/comment"));
                (self.client.post(url), false)
            }
        };

        let response = self
            .authorized(request)
            .json(&document)
            .send()
            .await
            .map_err(|e| from_transport(SERVICE, &e, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, Some(("issue", key)), response).await);
        }
        let payload = read_json(SERVICE, response, self.timeout).await?;
        let id = match payload.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => existing.ok_or_else(|| {
                ContextError::malformed(SERVICE, "comment response carries no id")
            })?,
        };

        Ok(PostedComment { id, updated })
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_issue(&self, key: &str) -> Result<RawIssue> {
        self.read_issue(key).await
    }

    async fn fetch_related_issue(&self, key: &str) -> Enrichment<RawIssue> {
        self.read_issue(key).await.into()
    }

    async fn fetch_comments(&self, key: &str) -> Enrichment<Vec<RawComment>> {
        self.list_comments(key).await.into()
    }
}
