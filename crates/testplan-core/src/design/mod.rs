//! Design-tool context: URL recognition and bounded tree collection.

mod model;

pub use model::{DesignComponent, DesignContext, DesignElement};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Deepest tree level that is visited (the document root is level 0).
pub const MAX_DEPTH: usize = 3;
/// Children visited per node.
pub const MAX_CHILDREN: usize = 50;
/// Elements returned per file.
pub const MAX_ELEMENTS: usize = 50;
/// Component definitions returned per file.
pub const MAX_COMPONENTS: usize = 30;

const COLLECTED_KINDS: [&str; 4] = ["FRAME", "COMPONENT", "PAGE", "CANVAS"];

static FILE_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"figma\.com/(?:file|design|proto)/([A-Za-z0-9]+)").expect("valid file key regex")
});

static DESIGN_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://(?:www\.)?figma\.com/(?:file|design|proto)/[A-Za-z0-9]+[^\s<>()\[\]"']*"#)
        .expect("valid design url regex")
});

/// Extracts the file key from a `file/`, `design/` or `proto/` URL.
pub fn parse_file_key(url: &str) -> Option<String> {
    FILE_KEY_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First design-file URL mentioned in free text.
pub fn find_design_url(text: &str) -> Option<String> {
    DESIGN_URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Collects frames, pages and components from a node tree.
///
/// Never descends below [`MAX_DEPTH`], visits at most [`MAX_CHILDREN`] per
/// node, and stops once [`MAX_ELEMENTS`] have been collected.
pub fn collect_elements(document: &Value) -> Vec<DesignElement> {
    let mut elements = Vec::new();
    collect(document, 0, &mut elements);
    elements.truncate(MAX_ELEMENTS);
    elements
}

fn collect(node: &Value, depth: usize, out: &mut Vec<DesignElement>) {
    if depth > MAX_DEPTH || out.len() >= MAX_ELEMENTS {
        return;
    }

    if let Some(kind) = node.get("type").and_then(Value::as_str) {
        if COLLECTED_KINDS.contains(&kind) {
            out.push(DesignElement {
                name: node
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unnamed")
                    .to_string(),
                kind: kind.to_string(),
                node_id: node.get("id").and_then(Value::as_str).map(str::to_string),
            });
        }
    }

    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children.iter().take(MAX_CHILDREN) {
            collect(child, depth + 1, out);
        }
    }
}

/// Projects the components endpoint payload (`meta.components`).
pub fn parse_components(payload: &Value) -> Vec<DesignComponent> {
    let Some(entries) = payload
        .get("meta")
        .and_then(|meta| meta.get("components"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .take(MAX_COMPONENTS)
        .map(|entry| {
            let frame = entry.get("containing_frame");
            let component_set_name = frame
                .and_then(|f| f.get("containingStateGroup"))
                .and_then(|group| group.get("name"))
                .or_else(|| frame.and_then(|f| f.get("name")))
                .and_then(Value::as_str)
                .map(str::to_string);

            DesignComponent {
                name: entry
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unnamed Component")
                    .to_string(),
                description: entry
                    .get("description")
                    .and_then(Value::as_str)
                    .filter(|d| !d.trim().is_empty())
                    .map(str::to_string),
                component_set_name,
            }
        })
        .collect()
}

/// Builds the context from a file payload and already-fetched components.
pub fn build_context(
    file_key: &str,
    file: &Value,
    components: Vec<DesignComponent>,
) -> DesignContext {
    let elements = file
        .get("document")
        .map(collect_elements)
        .unwrap_or_default();

    DesignContext {
        file_key: file_key.to_string(),
        file_name: file
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        last_modified: file
            .get("lastModified")
            .and_then(Value::as_str)
            .map(str::to_string),
        version: file.get("version").and_then(Value::as_str).map(str::to_string),
        elements,
        components,
    }
}
