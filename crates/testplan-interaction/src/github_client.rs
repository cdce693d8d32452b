//! Code host client (GitHub REST v3).
//!
//! Enriches pull requests found through the development-status API and reads
//! repository documentation for context.

use crate::http::{build_client, error_from_response, from_transport, read_json};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;
use testplan_core::config::GitHubConfig;
use testplan_core::development::{
    CodeReviewDetails, FileChange, MAX_TEST_EXAMPLES, RepositoryDocumentation, ReviewFetchOptions,
};
use testplan_core::enrichment::Enrichment;
use testplan_core::error::{ContextError, Result};
use testplan_core::issue::{Comment, CommentOrigin};
use testplan_core::source::CodeHost;

const SERVICE: &str = "GitHub";
const PRIMER_FILE: &str = "README.md";
const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];
const FILES_PER_PAGE: &str = "100";

static PULL_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)/pull/(\d+)").expect("valid pull request regex")
});

/// Owner, repository and number of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn parse(url: &str) -> Option<Self> {
        let caps = PULL_URL_RE.captures(url)?;
        Some(Self {
            owner: caps.get(1)?.as_str().to_string(),
            repo: caps.get(2)?.as_str().to_string(),
            number: caps.get(3)?.as_str().parse().ok()?,
        })
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    config: Option<GitHubConfig>,
    timeout: Duration,
}

impl GitHubClient {
    /// `config` of `None` disables every fetch.
    pub fn new(config: Option<GitHubConfig>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            config,
            timeout,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn get_json(&self, config: &GitHubConfig, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", config.api_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", config.token))
            .header(ACCEPT, "application/vnd.github.v3+json")
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| from_transport(SERVICE, &e, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, None, response).await);
        }
        read_json(SERVICE, response, self.timeout).await
    }

    async fn fetch_files(
        &self,
        config: &GitHubConfig,
        pr: &PullRequestRef,
        include_patch: bool,
    ) -> Result<Vec<FileChange>> {
        let path = format!("/repos/{}/{}/pulls/{}/files", pr.owner, pr.repo, pr.number);
        let payload = self.get_json(config, &path, &[("per_page", FILES_PER_PAGE)]).await?;
        Ok(items(&payload)
            .iter()
            .map(|file| FileChange {
                filename: str_of(file, "filename").unwrap_or_default(),
                status: str_of(file, "status").unwrap_or_else(|| "unknown".to_string()),
                additions: u64_of(file, "additions"),
                deletions: u64_of(file, "deletions"),
                changes: u64_of(file, "changes"),
                patch: if include_patch { str_of(file, "patch") } else { None },
            })
            .collect())
    }

    /// Conversation and inline review comments, merged in creation order.
    async fn fetch_comments(&self, config: &GitHubConfig, pr: &PullRequestRef) -> Vec<Comment> {
        let discussion_path = format!("/repos/{}/{}/issues/{}/comments", pr.owner, pr.repo, pr.number);
        let inline_path = format!("/repos/{}/{}/pulls/{}/comments", pr.owner, pr.repo, pr.number);
        let (discussion, inline) = tokio::join!(
            self.get_json(config, &discussion_path, &[]),
            self.get_json(config, &inline_path, &[]),
        );

        let mut comments = Vec::new();
        match discussion {
            Ok(payload) => comments.extend(
                items(&payload)
                    .iter()
                    .map(|c| review_comment(c, CommentOrigin::Discussion)),
            ),
            Err(err) => tracing::warn!(pr = pr.number, error = %err, "discussion comments unavailable"),
        }
        match inline {
            Ok(payload) => comments.extend(
                items(&payload)
                    .iter()
                    .map(|c| review_comment(c, CommentOrigin::InlineReview)),
            ),
            Err(err) => tracing::warn!(pr = pr.number, error = %err, "inline comments unavailable"),
        }
        comments.sort_by(|a, b| a.created.cmp(&b.created));
        comments
    }

    async fn fetch_primer(&self, config: &GitHubConfig, owner: &str, repo: &str) -> Option<String> {
        let path = format!("/repos/{owner}/{repo}/contents/{PRIMER_FILE}");
        for branch in DEFAULT_BRANCHES {
            match self.get_json(config, &path, &[("ref", branch)]).await {
                Ok(payload) => match decode_content(&payload) {
                    Some(text) => return Some(text),
                    None => tracing::debug!(repo, branch, "primer content not decodable"),
                },
                Err(err) => tracing::debug!(repo, branch, error = %err, "primer not found"),
            }
        }
        None
    }

    async fn search_test_examples(&self, config: &GitHubConfig, owner: &str, repo: &str) -> Vec<String> {
        let query = format!("repo:{owner}/{repo} path:test");
        let per_page = MAX_TEST_EXAMPLES.to_string();
        match self
            .get_json(config, "/search/code", &[("q", query.as_str()), ("per_page", per_page.as_str())])
            .await
        {
            Ok(payload) => payload
                .get("items")
                .map(items)
                .unwrap_or_default()
                .iter()
                .filter_map(|item| str_of(item, "path"))
                .take(MAX_TEST_EXAMPLES)
                .collect(),
            Err(err) => {
                tracing::debug!(repo, error = %err, "test example search failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl CodeHost for GitHubClient {
    fn is_supported_url(&self, url: &str) -> bool {
        PullRequestRef::parse(url).is_some()
    }

    async fn fetch_change(&self, url: &str, options: ReviewFetchOptions) -> Enrichment<CodeReviewDetails> {
        let Some(pr) = PullRequestRef::parse(url) else {
            tracing::debug!(url, "not a pull request url");
            return Enrichment::Absent;
        };
        let Some(config) = &self.config else {
            return Enrichment::Absent;
        };

        let details_path = format!("/repos/{}/{}/pulls/{}", pr.owner, pr.repo, pr.number);
        let comments = async {
            if options.include_comments {
                self.fetch_comments(config, &pr).await
            } else {
                Vec::new()
            }
        };
        let (details, files, comments) = tokio::join!(
            self.get_json(config, &details_path, &[]),
            self.fetch_files(config, &pr, options.include_patch),
            comments,
        );

        // Without the file list the change statistics are unknown, not zero.
        let (details, files) = match (details, files) {
            (Ok(details), Ok(files)) => (details, files),
            (Err(err), _) | (_, Err(err)) => return Enrichment::Failed(err),
        };

        let total_additions = files.iter().map(|f| f.additions).sum();
        let total_deletions = files.iter().map(|f| f.deletions).sum();
        tracing::debug!(pr = pr.number, files = files.len(), comments = comments.len(), "pull request enriched");

        Enrichment::Found(CodeReviewDetails {
            number: details.get("number").and_then(Value::as_u64).unwrap_or(pr.number),
            title: str_of(&details, "title").unwrap_or_default(),
            description: str_of(&details, "body").filter(|b| !b.trim().is_empty()),
            state: str_of(&details, "state").unwrap_or_else(|| "unknown".to_string()),
            merged: details.get("merged").and_then(Value::as_bool).unwrap_or(false),
            author: details.get("user").and_then(|u| str_of(u, "login")),
            files,
            total_additions,
            total_deletions,
            comments,
        })
    }

    async fn fetch_repository_docs(&self, url: &str) -> Enrichment<RepositoryDocumentation> {
        let Some(pr) = PullRequestRef::parse(url) else {
            return Enrichment::Absent;
        };
        let Some(config) = &self.config else {
            return Enrichment::Absent;
        };

        let (primer, test_examples) = tokio::join!(
            self.fetch_primer(config, &pr.owner, &pr.repo),
            self.search_test_examples(config, &pr.owner, &pr.repo),
        );
        let docs = RepositoryDocumentation { primer, test_examples };
        if docs.is_empty() {
            Enrichment::Absent
        } else {
            Enrichment::Found(docs)
        }
    }
}

fn review_comment(comment: &Value, origin: CommentOrigin) -> Comment {
    let body = str_of(comment, "body").unwrap_or_default();
    let body = match (origin, str_of(comment, "path").filter(|p| !p.is_empty())) {
        (CommentOrigin::InlineReview, Some(path)) => format!("[{path}] {body}"),
        _ => body,
    };
    Comment {
        author: comment
            .get("user")
            .and_then(|u| str_of(u, "login"))
            .unwrap_or_else(|| "unknown".to_string()),
        body,
        created: str_of(comment, "created_at"),
        updated: str_of(comment, "updated_at"),
        origin,
    }
}

/// Decodes a contents API payload (base64 with embedded newlines).
fn decode_content(payload: &Value) -> Option<String> {
    let encoded: String = payload
        .get("content")
        .and_then(Value::as_str)?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

fn items(payload: &Value) -> &[Value] {
    payload.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn str_of(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn u64_of(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}
