//! Development-status payload parsing.
//!
//! The issue tracker's development-status API is unofficial and loosely
//! shaped, so everything here walks `serde_json::Value` and skips what it
//! does not recognize.

mod model;

pub use model::{
    CodeChange, CodeReviewDetails, Commit, DevelopmentActivity, FileChange,
    RepositoryDocumentation, ReviewFetchOptions,
};

use serde_json::Value;
use strum::{AsRefStr, Display};

/// Example test-file paths kept in [`RepositoryDocumentation`].
pub const MAX_TEST_EXAMPLES: usize = 5;

const SUMMARY_CATEGORIES: [&str; 3] = ["repository", "pullrequest", "branch"];

/// Detail categories queried per application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum DevDataType {
    Repository,
    PullRequest,
}

/// Distinct integration application types named in a summary, in discovery order.
pub fn application_types(summary: &Value) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    let Some(categories) = summary.get("summary") else {
        return types;
    };

    for category in SUMMARY_CATEGORIES {
        let Some(by_type) = categories
            .get(category)
            .and_then(|c| c.get("byInstanceType"))
            .and_then(Value::as_object)
        else {
            continue;
        };
        for name in by_type.keys() {
            if !types.iter().any(|known| known == name) {
                types.push(name.clone());
            }
        }
    }
    types
}

/// Development data extracted from one detail response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailBatch {
    pub commits: Vec<Commit>,
    pub code_changes: Vec<CodeChange>,
    pub branches: Vec<String>,
}

/// Parses one detail response (`detail[]` of repositories, pull requests, branches).
pub fn parse_detail(payload: &Value) -> DetailBatch {
    let mut batch = DetailBatch::default();
    let Some(details) = payload.get("detail").and_then(Value::as_array) else {
        return batch;
    };

    for detail in details {
        for repository in array(detail, "repositories") {
            batch.commits.extend(array(repository, "commits").iter().map(parse_commit));
            batch.branches.extend(array(repository, "branches").iter().filter_map(branch_name));
        }
        batch.branches.extend(array(detail, "branches").iter().filter_map(branch_name));
        batch
            .code_changes
            .extend(array(detail, "pullRequests").iter().map(parse_code_change));
    }
    batch
}

impl DevelopmentActivity {
    /// Merges one detail batch, keeping discovery order and dropping duplicates.
    pub fn absorb(&mut self, batch: DetailBatch) {
        self.commits.extend(batch.commits);
        for branch in batch.branches {
            if !self.branches.contains(&branch) {
                self.branches.push(branch);
            }
        }
        for change in batch.code_changes {
            let duplicate = change.url.is_some()
                && self.code_changes.iter().any(|known| known.url == change.url);
            if !duplicate {
                self.code_changes.push(change);
            }
        }
    }
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_commit(commit: &Value) -> Commit {
    Commit {
        message: string(commit, "message").unwrap_or_default().trim().to_string(),
        author: commit.get("author").and_then(|a| string(a, "name")),
        timestamp: string(commit, "authorTimestamp"),
        url: string(commit, "url"),
    }
}

fn branch_name(branch: &Value) -> Option<String> {
    string(branch, "name").filter(|name| !name.is_empty())
}

fn parse_code_change(change: &Value) -> CodeChange {
    CodeChange {
        title: string(change, "name").unwrap_or_else(|| "Untitled change".to_string()),
        status: string(change, "status").unwrap_or_else(|| "UNKNOWN".to_string()),
        url: string(change, "url"),
        source_branch: change.get("source").and_then(|s| string(s, "branch")),
        destination_branch: change.get("destination").and_then(|d| string(d, "branch")),
        review: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_types_are_distinct_and_ordered() {
        let summary = json!({
            "summary": {
                "repository": {"byInstanceType": {"GitHub": {"count": 2}}},
                "pullrequest": {"byInstanceType": {"GitHub": {"count": 1}, "bitbucket": {"count": 1}}},
                "branch": {"byInstanceType": {}}
            }
        });
        assert_eq!(application_types(&summary), vec!["GitHub", "bitbucket"]);
        assert!(application_types(&json!({"errors": []})).is_empty());
    }

    #[test]
    fn test_data_type_strings() {
        assert_eq!(DevDataType::Repository.as_ref(), "repository");
        assert_eq!(DevDataType::PullRequest.as_ref(), "pullrequest");
    }

    #[test]
    fn test_parse_repository_detail() {
        let payload = json!({
            "detail": [{
                "repositories": [{
                    "name": "shop",
                    "commits": [{
                        "message": "Add checkout validation\n",
                        "author": {"name": "Dana"},
                        "authorTimestamp": "2024-05-01T10:00:00.000+0000",
                        "url": "https://github.com/acme/shop/commit/abc"
                    }, {}],
                    "branches": [{"name": "feature/checkout"}]
                }],
                "branches": [{"name": "feature/checkout"}, {"name": ""}]
            }]
        });
        let batch = parse_detail(&payload);
        assert_eq!(batch.commits.len(), 2);
        assert_eq!(batch.commits[0].message, "Add checkout validation");
        assert_eq!(batch.commits[0].author.as_deref(), Some("Dana"));
        assert_eq!(batch.commits[1].message, "");
        assert_eq!(batch.branches, vec!["feature/checkout", "feature/checkout"]);
    }

    #[test]
    fn test_parse_pull_request_detail_and_absorb() {
        let payload = json!({
            "detail": [{
                "pullRequests": [{
                    "name": "Checkout validation",
                    "status": "OPEN",
                    "url": "https://github.com/acme/shop/pull/42",
                    "source": {"branch": "feature/checkout"},
                    "destination": {"branch": "main"}
                }, {
                    "status": "MERGED"
                }],
                "branches": [{"name": "feature/checkout"}]
            }]
        });
        let batch = parse_detail(&payload);
        assert_eq!(batch.code_changes.len(), 2);
        assert_eq!(batch.code_changes[0].destination_branch.as_deref(), Some("main"));
        assert_eq!(batch.code_changes[1].title, "Untitled change");

        let mut activity = DevelopmentActivity::default();
        activity.absorb(batch.clone());
        activity.absorb(batch);
        // The second untitled change has no url, so it cannot be deduplicated.
        assert_eq!(activity.code_changes.len(), 3);
        assert_eq!(activity.branches, vec!["feature/checkout"]);
        assert!(!activity.has_no_work());
    }

    #[test]
    fn test_malformed_detail_yields_empty_batch() {
        assert_eq!(parse_detail(&json!({"detail": "oops"})), DetailBatch::default());
        assert_eq!(parse_detail(&json!(null)), DetailBatch::default());
    }
}
