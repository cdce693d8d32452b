//! Classification of raw issue links into "blocks" and "causes" relationships.

use crate::issue::{LinkedIssue, LinkedIssues};
use serde_json::Value;

/// Entries kept per directional list.
pub const MAX_LINKED_PER_DIRECTION: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Blocks,
    Causes,
}

/// Sorts links into blocks / blocked-by / causes / caused-by.
///
/// Returns `None` when no link belongs to either family. Links whose target
/// issue is missing or malformed are kept as [`LinkedIssue::placeholder`].
pub fn classify_links(links: &[Value]) -> Option<LinkedIssues> {
    let mut result = LinkedIssues::default();
    let mut matched = 0usize;

    for link in links {
        let Some(family) = link_family(link) else {
            continue;
        };
        matched += 1;

        let (target, inverse) = match (link.get("inwardIssue"), link.get("outwardIssue")) {
            (Some(issue), _) => (issue, true),
            (None, Some(issue)) => (issue, false),
            (None, None) => (&Value::Null, names_inverse(link)),
        };
        let entry = linked_issue(target).unwrap_or_else(LinkedIssue::placeholder);

        let list = match (family, inverse) {
            (Family::Blocks, false) => &mut result.blocks,
            (Family::Blocks, true) => &mut result.blocked_by,
            (Family::Causes, false) => &mut result.causes,
            (Family::Causes, true) => &mut result.caused_by,
        };
        if list.len() < MAX_LINKED_PER_DIRECTION {
            list.push(entry);
        }
    }

    if matched == 0 {
        tracing::debug!(links = links.len(), "no blocking or causal links");
        return None;
    }
    Some(result)
}

fn link_type_text(link: &Value) -> String {
    let Some(kind) = link.get("type") else {
        return String::new();
    };
    match kind {
        Value::String(name) => name.to_lowercase(),
        _ => ["name", "inward", "outward"]
            .iter()
            .filter_map(|field| kind.get(*field).and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase(),
    }
}

fn link_family(link: &Value) -> Option<Family> {
    let text = link_type_text(link);
    if text.contains("block") {
        Some(Family::Blocks)
    } else if text.contains("cause") {
        Some(Family::Causes)
    } else {
        None
    }
}

// Without a nested issue the only hint left is the type name itself.
fn names_inverse(link: &Value) -> bool {
    let name = match link.get("type") {
        Some(Value::String(name)) => name.to_lowercase(),
        Some(kind) => kind
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase(),
        None => String::new(),
    };
    name.contains("blocked by") || name.contains("caused by")
}

fn linked_issue(issue: &Value) -> Option<LinkedIssue> {
    let key = issue.get("key").and_then(Value::as_str)?;
    let fields = issue.get("fields");
    let nested_name = |field: &str| {
        fields
            .and_then(|f| f.get(field))
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Some(LinkedIssue {
        key: key.to_string(),
        summary: fields
            .and_then(|f| f.get("summary"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        status: nested_name("status"),
        issue_type: nested_name("issuetype"),
        priority: nested_name("priority"),
    })
}
