use crate::design::DesignContext;
use crate::development::DevelopmentActivity;
use crate::quality::DescriptionAnalysis;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

/// Composed context for one issue, built fresh per request.
///
/// Parent and linked issues are shallow projections, so the structure never
/// contains cycles and serializes to plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    /// Issue title.
    pub summary: String,
    /// Rich-text description exactly as received.
    #[serde(skip)]
    pub raw_description: Option<Value>,
    /// Extracted plain-text description; `None` when empty.
    pub description: Option<String>,
    pub description_analysis: DescriptionAnalysis,
    pub issue_type: String,
    pub labels: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Linked code work and the issue's own design. When the issue has a design
    /// link but no commits, changes or branches, this holds a design-only
    /// activity for which `has_no_work()` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub development: Option<DevelopmentActivity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_issues: Option<LinkedIssues>,
    pub comments: Vec<Comment>,
}

/// The issue's parent, one level up only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentIssue {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: String,
    pub labels: Vec<String>,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignContext>,
}

/// Placeholder key for links whose target could not be read.
pub const UNKNOWN_ISSUE_KEY: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedIssue {
    pub key: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl LinkedIssue {
    pub fn placeholder() -> Self {
        Self {
            key: UNKNOWN_ISSUE_KEY.to_string(),
            summary: String::new(),
            status: None,
            issue_type: None,
            priority: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.key == UNKNOWN_ISSUE_KEY
    }
}

/// Classified links. All four lists are present once any link matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedIssues {
    pub blocks: Vec<LinkedIssue>,
    pub blocked_by: Vec<LinkedIssue>,
    pub causes: Vec<LinkedIssue>,
    pub caused_by: Vec<LinkedIssue>,
}

impl LinkedIssues {
    pub fn total(&self) -> usize {
        self.blocks.len() + self.blocked_by.len() + self.causes.len() + self.caused_by.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    /// Bytes.
    pub size: u64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommentOrigin {
    /// Issue comments and code-review conversation.
    Discussion,
    /// Line-level code-review comments.
    InlineReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    /// Plain text.
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub origin: CommentOrigin,
}

/// An issue as read from the tracker, before any enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIssue {
    /// Internal numeric identifier, required by the development-status API.
    pub id: String,
    pub key: String,
    pub summary: String,
    pub description: Option<Value>,
    pub labels: Vec<String>,
    pub issue_type: String,
    pub attachments: Vec<Attachment>,
    pub parent_key: Option<String>,
    pub links: Vec<Value>,
}

/// A tracker comment with its rich-text body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawComment {
    pub id: Option<String>,
    pub author: String,
    pub body: Value,
    pub created: Option<String>,
    pub updated: Option<String>,
}
