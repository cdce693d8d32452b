use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use testplan_core::auth::AuthErrorKind;
use testplan_core::config::GitHubConfig;
use testplan_core::development::ReviewFetchOptions;
use testplan_core::enrichment::Enrichment;
use testplan_core::issue::CommentOrigin;
use testplan_core::source::CodeHost;
use testplan_interaction::GitHubClient;

const PR_URL: &str = "https://github.com/acme/shop/pull/42";

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(
        Some(GitHubConfig {
            token: "ghp_test".to_string(),
            api_url: server.base_url(),
        }),
        Duration::from_secs(5),
    )
}

async fn mock_pull_request(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/shop/pulls/42")
                .header("authorization", "Bearer ghp_test");
            then.status(200).json_body(json!({
                "number": 42,
                "title": "Checkout validation",
                "body": "Adds cart checks",
                "state": "closed",
                "merged": true,
                "user": {"login": "dana"}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/pulls/42/files");
            then.status(200).json_body(json!([
                {"filename": "src/cart.rs", "status": "modified", "additions": 10, "deletions": 2, "changes": 12, "patch": "@@"},
                {"filename": "tests/cart.rs", "status": "added", "additions": 30, "deletions": 0, "changes": 30}
            ]));
        })
        .await;
}

#[tokio::test]
async fn test_fetch_change_with_comments() {
    let server = MockServer::start_async().await;
    mock_pull_request(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/issues/42/comments");
            then.status(200).json_body(json!([
                {"user": {"login": "qa"}, "body": "Verified on staging", "created_at": "2024-05-02T10:00:00Z"}
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/pulls/42/comments");
            then.status(200).json_body(json!([
                {"user": {"login": "rev"}, "body": "Handle zero", "path": "src/cart.rs", "created_at": "2024-05-01T09:00:00Z"}
            ]));
        })
        .await;

    let details = client(&server)
        .fetch_change(PR_URL, ReviewFetchOptions::default())
        .await
        .found()
        .expect("pull request details");

    assert_eq!(details.title, "Checkout validation");
    assert!(details.merged);
    assert_eq!(details.author.as_deref(), Some("dana"));
    assert_eq!(details.total_additions, 40);
    assert_eq!(details.total_deletions, 2);
    assert_eq!(details.total_changes(), 42);
    assert!(details.files.iter().all(|f| f.patch.is_none()));

    assert_eq!(details.comments.len(), 2);
    assert_eq!(details.comments[0].origin, CommentOrigin::InlineReview);
    assert_eq!(details.comments[0].body, "[src/cart.rs] Handle zero");
    assert_eq!(details.comments[1].origin, CommentOrigin::Discussion);
}

#[tokio::test]
async fn test_comment_failures_do_not_fail_the_change() {
    let server = MockServer::start_async().await;
    mock_pull_request(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/issues/42/comments");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/pulls/42/comments");
            then.status(500);
        })
        .await;

    let details = client(&server)
        .fetch_change(
            PR_URL,
            ReviewFetchOptions {
                include_patch: true,
                include_comments: true,
            },
        )
        .await
        .found()
        .expect("pull request details");
    assert!(details.comments.is_empty());
    assert_eq!(details.files[0].patch.as_deref(), Some("@@"));
}

#[tokio::test]
async fn test_unreadable_file_list_fails_the_change() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/pulls/42");
            then.status(200)
                .json_body(json!({"number": 42, "title": "Checkout validation", "state": "open"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/shop/pulls/42/files");
            then.status(502).body("bad gateway");
        })
        .await;

    let outcome = client(&server)
        .fetch_change(
            PR_URL,
            ReviewFetchOptions {
                include_patch: false,
                include_comments: false,
            },
        )
        .await;
    match outcome {
        Enrichment::Failed(err) => assert!(err.to_string().contains("502"), "{err}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_token_is_a_soft_auth_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/repos/acme/shop");
            then.status(401).json_body(json!({"message": "Bad credentials"}));
        })
        .await;

    match client(&server)
        .fetch_change(
            PR_URL,
            ReviewFetchOptions {
                include_patch: false,
                include_comments: false,
            },
        )
        .await
    {
        Enrichment::Failed(err) => assert_eq!(err.auth_kind(), Some(AuthErrorKind::Invalid)),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_repository_docs_fall_back_to_master() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/shop/contents/README.md")
                .query_param("ref", "main");
            then.status(404).json_body(json!({"message": "Not Found"}));
        })
        .await;
    let encoded = STANDARD.encode("# Shop\nRun the suite with cargo test.\n");
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/shop/contents/README.md")
                .query_param("ref", "master");
            then.status(200)
                .json_body(json!({"encoding": "base64", "content": format!("{}\n{}", &encoded[..8], &encoded[8..])}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search/code");
            then.status(200).json_body(json!({"items": [
                {"path": "tests/cart.rs"}, {"path": "tests/checkout.rs"}
            ]}));
        })
        .await;

    let docs = client(&server)
        .fetch_repository_docs(PR_URL)
        .await
        .found()
        .expect("repository docs");
    assert!(docs.primer.as_deref().unwrap().starts_with("# Shop"));
    assert_eq!(docs.test_examples, vec!["tests/cart.rs", "tests/checkout.rs"]);
}

#[tokio::test]
async fn test_repository_docs_absent_when_nothing_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(404);
        })
        .await;

    assert!(matches!(
        client(&server).fetch_repository_docs(PR_URL).await,
        Enrichment::Absent
    ));
}
