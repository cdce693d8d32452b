//! Identification of comments this system authored itself.
//!
//! The issue tracker gives us no author-side identifier we control, so the
//! generated comment starts with a fixed marker. This is the only place the
//! marker text lives.

/// Prefix of every comment this system posts.
pub const SYSTEM_COMMENT_MARKER: &str = "🤖 Generated Test Plan";

/// Marks and recognizes system-authored comment bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommentMarker;

impl SystemCommentMarker {
    /// True if the plain-text body was produced by this system.
    pub fn is_marked(&self, text: &str) -> bool {
        text.contains(SYSTEM_COMMENT_MARKER)
    }

    /// Prefixes `body` with the marker.
    pub fn mark(&self, body: &str) -> String {
        format!("{SYSTEM_COMMENT_MARKER}\n\n{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_body_is_recognized() {
        let marker = SystemCommentMarker;
        let body = marker.mark("1. Happy path");
        assert!(body.starts_with(SYSTEM_COMMENT_MARKER));
        assert!(marker.is_marked(&body));
        assert!(!marker.is_marked("Regular comment"));
    }
}
