//! Issue model and projection from the issue tracker's REST payloads.

mod model;

pub use model::{
    Attachment, Comment, CommentOrigin, Issue, LinkedIssue, LinkedIssues, ParentIssue,
    RawComment, RawIssue, UNKNOWN_ISSUE_KEY,
};

use crate::adf;
use crate::config::ContextPolicy;
use crate::error::{ContextError, Result};
use serde_json::Value;

/// Field selection shared by primary and parent issue reads.
pub const ISSUE_FIELDS: &str = "summary,description,labels,issuetype,attachment,parent,issuelinks";

impl RawIssue {
    /// Parses an issue read response. Only `id` and `key` are mandatory.
    pub fn from_json(payload: &Value) -> Result<Self> {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ContextError::malformed("Jira", "issue payload has no id"))?;
        let key = payload
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| ContextError::malformed("Jira", "issue payload has no key"))?;
        let fields = payload.get("fields").unwrap_or(&Value::Null);

        Ok(Self {
            id: id.to_string(),
            key: key.to_string(),
            summary: str_field(fields, "summary").unwrap_or_default(),
            description: fields.get("description").filter(|d| !d.is_null()).cloned(),
            labels: fields
                .get("labels")
                .and_then(Value::as_array)
                .map(|labels| {
                    labels
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            issue_type: fields
                .get("issuetype")
                .and_then(|t| str_field(t, "name"))
                .unwrap_or_else(|| "Unknown".to_string()),
            attachments: fields
                .get("attachment")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(parse_attachment).collect())
                .unwrap_or_default(),
            parent_key: fields
                .get("parent")
                .and_then(|p| str_field(p, "key"))
                .filter(|k| !k.trim().is_empty()),
            links: fields
                .get("issuelinks")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Extracted plain-text description.
    pub fn description_text(&self) -> String {
        adf::extract_text(self.description.as_ref())
    }
}

impl RawComment {
    pub fn from_json(payload: &Value) -> Self {
        Self {
            id: match payload.get("id") {
                Some(Value::String(id)) => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            },
            author: payload
                .get("author")
                .and_then(|a| str_field(a, "displayName"))
                .unwrap_or_else(|| "Unknown".to_string()),
            body: payload.get("body").cloned().unwrap_or(Value::Null),
            created: str_field(payload, "created"),
            updated: str_field(payload, "updated"),
        }
    }
}

/// Parses a comment list response (`{"comments": [...]}`), oldest first.
pub fn parse_comment_page(payload: &Value) -> Vec<RawComment> {
    payload
        .get("comments")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(RawComment::from_json).collect())
        .unwrap_or_default()
}

fn parse_attachment(item: &Value) -> Option<Attachment> {
    Some(Attachment {
        filename: str_field(item, "filename")?,
        mime_type: str_field(item, "mimeType").unwrap_or_default(),
        size: item.get("size").and_then(Value::as_u64).unwrap_or(0),
        url: str_field(item, "content")?,
        thumbnail_url: str_field(item, "thumbnail"),
    })
}

/// Image attachments within the policy's count and size bounds, in upload order.
pub fn select_image_attachments(attachments: &[Attachment], policy: &ContextPolicy) -> Vec<Attachment> {
    attachments
        .iter()
        .filter(|a| a.is_image() && a.size <= policy.max_attachment_bytes)
        .take(policy.max_image_attachments)
        .cloned()
        .collect()
}

impl ParentIssue {
    /// Shallow projection of a parent read; the design context is resolved separately.
    pub fn from_raw(raw: RawIssue, policy: &ContextPolicy) -> Self {
        let description = Some(raw.description_text()).filter(|text| !text.is_empty());
        Self {
            attachments: select_image_attachments(&raw.attachments, policy),
            key: raw.key,
            summary: raw.summary,
            description,
            issue_type: raw.issue_type,
            labels: raw.labels,
            design: None,
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
