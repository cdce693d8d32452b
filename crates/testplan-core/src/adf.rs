//! Plain-text extraction from the issue tracker's rich-text documents.
//!
//! Documents are nested `{type, text?, marks?, attrs?, content?}` nodes. The
//! walk is depth-first and never fails: missing or mistyped fields count as
//! "no content".

use serde_json::{Map, Value};

/// Nodes nested deeper than this are ignored.
pub const MAX_DOCUMENT_DEPTH: usize = 64;

const BULLET: &str = "•";

/// Extracts readable text from a rich-text document, a plain string, or nothing.
///
/// Struck-through runs are dropped: they mark retracted requirements. Link
/// cards carry no text of their own, so their URL attribute is emitted instead.
pub fn extract_text(content: Option<&Value>) -> String {
    match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(node @ (Value::Object(_) | Value::Array(_))) => {
            let mut walker = TextWalker::default();
            walker.visit(node, 0);
            walker.finish()
        }
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Shorthand for documents that are known to be present.
pub fn plain_text(content: &Value) -> String {
    extract_text(Some(content))
}

/// Wraps plain text in a single-paragraph document, as accepted by comment writes.
pub fn paragraph_document(text: &str) -> Value {
    serde_json::json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{"type": "text", "text": text}]
        }]
    })
}

#[derive(Default)]
struct TextWalker {
    parts: Vec<String>,
    pending_bullet: bool,
}

impl TextWalker {
    fn visit(&mut self, node: &Value, depth: usize) {
        if depth > MAX_DOCUMENT_DEPTH {
            return;
        }
        match node {
            Value::String(text) => self.push_text(text),
            Value::Array(items) => {
                for item in items {
                    self.visit(item, depth);
                }
            }
            Value::Object(map) => self.visit_node(map, depth),
            _ => {}
        }
    }

    fn visit_node(&mut self, node: &Map<String, Value>, depth: usize) {
        if let Some(text) = node.get("text").and_then(Value::as_str) {
            if !is_struck_through(node) {
                self.push_text(text);
            }
        }

        let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
        match node_type {
            "inlineCard" | "blockCard" | "embedCard" => {
                if let Some(url) = node
                    .get("attrs")
                    .and_then(|attrs| attrs.get("url"))
                    .and_then(Value::as_str)
                {
                    self.push_text(url);
                }
            }
            "paragraph" | "heading" | "codeBlock" | "bulletList" | "orderedList" => {
                self.visit_children(node, depth);
                self.parts.push(String::new());
            }
            "listItem" => {
                self.pending_bullet = true;
                self.visit_children(node, depth);
                self.pending_bullet = false;
            }
            _ => self.visit_children(node, depth),
        }
    }

    fn visit_children(&mut self, node: &Map<String, Value>, depth: usize) {
        if let Some(children) = node.get("content") {
            self.visit(children, depth + 1);
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.pending_bullet {
            self.pending_bullet = false;
            self.parts.push(format!("{BULLET} {text}"));
        } else {
            self.parts.push(text.to_string());
        }
    }

    fn finish(self) -> String {
        self.parts.join("\n").trim().to_string()
    }
}

fn is_struck_through(node: &Map<String, Value>) -> bool {
    node.get("marks")
        .and_then(Value::as_array)
        .is_some_and(|marks| {
            marks.iter().any(|mark| {
                matches!(
                    mark.get("type").and_then(Value::as_str),
                    Some("strike" | "strikethrough")
                )
            })
        })
}
