use crate::design::DesignContext;
use crate::issue::Comment;
use serde::{Deserialize, Serialize};

/// Development work linked to an issue.
///
/// Never constructed empty by the resolver: no commits, changes or branches
/// means no activity at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentActivity {
    pub commits: Vec<Commit>,
    pub code_changes: Vec<CodeChange>,
    pub branches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_docs: Option<RepositoryDocumentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignContext>,
}

impl DevelopmentActivity {
    /// True when no development data was discovered.
    pub fn has_no_work(&self) -> bool {
        self.commits.is_empty() && self.code_changes.is_empty() && self.branches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A pull/merge request linked through the development-status API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChange {
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_branch: Option<String>,
    /// Present only when the code host is supported and credentials exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<CodeReviewDetails>,
}

/// Code-host view of a change: statistics and discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReviewDetails {
    pub number: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: String,
    pub merged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub files: Vec<FileChange>,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub comments: Vec<Comment>,
}

impl CodeReviewDetails {
    pub fn total_changes(&self) -> u64 {
        self.total_additions + self.total_deletions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    /// "added", "modified", "removed", "renamed"
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    /// Raw diff text, only when explicitly requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// Repository documentation used to ground generated tests in project conventions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDocumentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primer: Option<String>,
    /// Paths of example test files, at most [`super::MAX_TEST_EXAMPLES`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_examples: Vec<String>,
}

impl RepositoryDocumentation {
    pub fn is_empty(&self) -> bool {
        self.primer.is_none() && self.test_examples.is_empty()
    }
}

/// Which options a code-review fetch should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewFetchOptions {
    pub include_patch: bool,
    pub include_comments: bool,
}

impl Default for ReviewFetchOptions {
    fn default() -> Self {
        Self {
            include_patch: false,
            include_comments: true,
        }
    }
}
