use httpmock::prelude::*;
use serde_json::{Value, json};
use std::time::Duration;
use testplan_core::auth::AuthErrorKind;
use testplan_core::comment_filter::filter_comments;
use testplan_core::config::{ContextPolicy, JiraConfig};
use testplan_core::enrichment::Enrichment;
use testplan_core::error::ContextError;
use testplan_core::issue::ISSUE_FIELDS;
use testplan_core::marker::SYSTEM_COMMENT_MARKER;
use testplan_core::source::IssueTracker;
use testplan_interaction::JiraClient;

fn client(server: &MockServer) -> JiraClient {
    JiraClient::new(
        JiraConfig {
            base_url: format!("{}/", server.base_url()),
            email: "qa@acme.test".to_string(),
            api_token: "jira-token".to_string(),
        },
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_fetch_issue_parses_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/api/3/issue/SHOP-7")
                .query_param("fields", ISSUE_FIELDS)
                .header_exists("authorization");
            then.status(200).json_body(json!({
                "id": "10007",
                "key": "SHOP-7",
                "fields": {
                    "summary": "Checkout validation",
                    "description": "Cart must not be empty",
                    "issuetype": {"name": "Story"},
                    "labels": ["checkout"],
                    "parent": {"key": "SHOP-1"}
                }
            }));
        })
        .await;

    let issue = client(&server).fetch_issue("SHOP-7").await.unwrap();

    mock.assert_async().await;
    assert_eq!(issue.id, "10007");
    assert_eq!(issue.summary, "Checkout validation");
    assert_eq!(issue.parent_key.as_deref(), Some("SHOP-1"));
    assert_eq!(issue.description_text(), "Cart must not be empty");
}

#[tokio::test]
async fn test_missing_issue_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-404");
            then.status(404)
                .json_body(json!({"errorMessages": ["Issue does not exist or you do not have permission to see it."]}));
        })
        .await;

    let err = client(&server).fetch_issue("SHOP-404").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_expired_token_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-7");
            then.status(401).body("API token has expired");
        })
        .await;

    let err = client(&server).fetch_issue("SHOP-7").await.unwrap_err();
    assert_eq!(err.auth_kind(), Some(AuthErrorKind::Expired));
}

#[tokio::test]
async fn test_related_issue_failure_is_soft() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-1");
            then.status(403).body("forbidden");
        })
        .await;

    match client(&server).fetch_related_issue("SHOP-1").await {
        Enrichment::Failed(err) => {
            assert_eq!(err.auth_kind(), Some(AuthErrorKind::InsufficientPermissions))
        }
        other => panic!("expected a soft failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-7");
            then.status(200).delay(Duration::from_secs(2)).json_body(json!({}));
        })
        .await;

    let jira = JiraClient::new(
        JiraConfig {
            base_url: server.base_url(),
            email: "qa@acme.test".to_string(),
            api_token: "t".to_string(),
        },
        Duration::from_millis(200),
    );
    let err = jira.fetch_issue("SHOP-7").await.unwrap_err();
    assert!(matches!(err, ContextError::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn test_fetch_comments() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-7/comment");
            then.status(200).json_body(json!({"comments": [
                {"id": "1", "author": {"displayName": "Riley"}, "body": "Please verify totals"},
                {"id": "2", "author": {"displayName": "Sam"}, "body": "Done"}
            ]}));
        })
        .await;

    let comments = client(&server)
        .fetch_comments("SHOP-7")
        .await
        .found()
        .expect("comments");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].author, "Sam");
}

fn neutral_comments(range: std::ops::RangeInclusive<usize>) -> Vec<Value> {
    range
        .map(|i| json!({"id": i.to_string(), "author": {"displayName": format!("u{i}")}, "body": format!("Looks good {i}")}))
        .collect()
}

async fn mock_comment_page(server: &MockServer, start_at: &str, comments: Vec<Value>) {
    let start: u64 = start_at.parse().unwrap();
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/api/3/issue/SHOP-7/comment")
                .query_param("startAt", start_at)
                .query_param("maxResults", "100");
            then.status(200).json_body(json!({
                "startAt": start,
                "maxResults": 100,
                "total": 105,
                "comments": comments
            }));
        })
        .await;
}

#[tokio::test]
async fn test_long_comment_history_is_read_to_the_end() {
    let server = MockServer::start_async().await;
    mock_comment_page(&server, "0", neutral_comments(1..=100)).await;
    let mut tail = neutral_comments(101..=104);
    tail.push(json!({"id": "105", "author": {"displayName": "u105"}, "body": "Please verify the empty cart case"}));
    mock_comment_page(&server, "100", tail).await;

    let comments = client(&server)
        .fetch_comments("SHOP-7")
        .await
        .found()
        .expect("comments");
    assert_eq!(comments.len(), 105);
    assert_eq!(comments[104].author, "u105");

    let selected = filter_comments(&comments, &ContextPolicy::default());
    assert_eq!(selected[0].author, "u105");
    assert!(selected.iter().all(|c| c.author != "u1"));
}

#[tokio::test]
async fn test_post_comment_finds_system_comment_on_later_page() {
    let server = MockServer::start_async().await;
    mock_comment_page(&server, "0", neutral_comments(1..=100)).await;
    let mut tail = neutral_comments(101..=104);
    tail.push(json!({"id": "105", "author": {"displayName": "Bot"}, "body": format!("{SYSTEM_COMMENT_MARKER}\n\nOld plan")}));
    mock_comment_page(&server, "100", tail).await;

    let update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/rest/api/3/issue/SHOP-7/comment/105");
            then.status(200).json_body(json!({"id": "105"}));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/api/3/issue/SHOP-7/comment");
            then.status(201).json_body(json!({"id": "106"}));
        })
        .await;

    let posted = client(&server).post_comment("SHOP-7", "New plan").await.unwrap();

    update.assert_async().await;
    assert_eq!(create.hits_async().await, 0);
    assert_eq!(posted.id, "105");
    assert!(posted.updated);
}

#[tokio::test]
async fn test_post_comment_updates_existing_system_comment() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-7/comment");
            then.status(200).json_body(json!({"comments": [
                {"id": "5", "author": {"displayName": "Riley"}, "body": "Human note"},
                {"id": "6", "author": {"displayName": "Bot"}, "body": {
                    "type": "doc", "version": 1,
                    "content": [{"type": "paragraph", "content": [
                        {"type": "text", "text": format!("{SYSTEM_COMMENT_MARKER}\n\nOld plan")}
                    ]}]
                }}
            ]}));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/rest/api/3/issue/SHOP-7/comment/6")
                .body_contains("New plan");
            then.status(200).json_body(json!({"id": "6"}));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/api/3/issue/SHOP-7/comment");
            then.status(201).json_body(json!({"id": "99"}));
        })
        .await;

    let posted = client(&server).post_comment("SHOP-7", "New plan").await.unwrap();

    update.assert_async().await;
    assert_eq!(create.hits_async().await, 0);
    assert_eq!(posted.id, "6");
    assert!(posted.updated);
}

#[tokio::test]
async fn test_post_comment_creates_when_listing_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/api/3/issue/SHOP-7/comment");
            then.status(500).body("boom");
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/api/3/issue/SHOP-7/comment")
                .body_contains("Generated Test Plan")
                .body_contains("1. Happy path");
            then.status(201).json_body(json!({"id": "100"}));
        })
        .await;

    let posted = client(&server).post_comment("SHOP-7", "1. Happy path").await.unwrap();

    create.assert_async().await;
    assert_eq!(posted.id, "100");
    assert!(!posted.updated);
}
