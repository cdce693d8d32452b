//! Selection of a small, representative subset of issue comments.

use crate::adf;
use crate::config::ContextPolicy;
use crate::issue::{Comment, CommentOrigin, RawComment};
use crate::marker::SystemCommentMarker;
use crate::quality::contains_any;

/// Most recent comments considered.
pub const RECENT_COMMENT_WINDOW: usize = 10;
/// Comments returned.
pub const MAX_SELECTED_COMMENTS: usize = 3;

/// Picks at most [`MAX_SELECTED_COMMENTS`] comments, preferring testing-related ones.
///
/// `raw` is ordered oldest first. Only the last [`RECENT_COMMENT_WINDOW`] are
/// looked at, and comments carrying the system marker are always dropped.
/// Testing-related comments come first, topped up with the earliest other
/// comments; relative order is preserved within each group.
pub fn filter_comments(raw: &[RawComment], policy: &ContextPolicy) -> Vec<Comment> {
    let marker = SystemCommentMarker;
    let window = &raw[raw.len().saturating_sub(RECENT_COMMENT_WINDOW)..];

    let retained: Vec<Comment> = window
        .iter()
        .map(|comment| Comment {
            author: comment.author.clone(),
            body: adf::plain_text(&comment.body),
            created: comment.created.clone(),
            updated: comment.updated.clone(),
            origin: CommentOrigin::Discussion,
        })
        .filter(|comment| !marker.is_marked(&comment.body))
        .collect();

    let (testing, other): (Vec<Comment>, Vec<Comment>) = retained
        .into_iter()
        .partition(|comment| contains_any(&comment.body.to_lowercase(), &policy.comment_keywords));

    tracing::debug!(
        considered = window.len(),
        testing = testing.len(),
        other = other.len(),
        "filtered comments"
    );

    testing
        .into_iter()
        .chain(other)
        .take(MAX_SELECTED_COMMENTS)
        .collect()
}
