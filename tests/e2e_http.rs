//! HTTP surface E2E tests: webhook in, report out

mod helper;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use depstale::service::routes::{AppState, build_router};
use depstale::service::trigger::TriggerHandler;
use depstale::version::cache::{MemoryReportStore, ReportStore};
use helper::{FakeHost, FakeRegistry, create_test_pipeline, repo};

fn create_test_router(host: FakeHost, registry: FakeRegistry) -> (Arc<MemoryReportStore>, Router) {
    let (store, pipeline) = create_test_pipeline(Arc::new(host), Arc::new(registry));
    let router = build_router(AppState::new(TriggerHandler::new(Arc::new(pipeline))));
    (store, router)
}

fn push_event(owner: &str, name: &str) -> Request<Body> {
    let body = serde_json::json!({
        "ref": "refs/heads/main",
        "repository": {"name": name, "owner": {"name": owner, "email": null}},
        "pusher": {"name": owner}
    });
    Request::builder()
        .method("POST")
        .uri("/commit")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn wait_for_report(store: &MemoryReportStore, slug: &str) {
    let repository = repo(slug);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while store.get(&repository).is_none() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {}", slug);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn commit_is_acknowledged_and_report_published() {
    let (store, router) = create_test_router(
        FakeHost::new().with_manifest("octocat/app", r#"{"dependencies": {"left-pad": "^1.0.0"}}"#),
        FakeRegistry::new().with_latest("left-pad", "2.0.0"),
    );

    let (status, body) = get_body(router.clone(), "/repos/octocat/app/report").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"status":"not available"}"#);

    let response = router.clone().oneshot(push_event("octocat", "app")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"{}");

    wait_for_report(&store, "octocat/app").await;

    let (status, body) = get_body(router.clone(), "/repos/octocat/app/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&body).unwrap(),
        serde_json::json!([{"name": "left-pad", "current": "^1.0.0", "latest": "2.0.0"}])
    );

    let (_, body) = get_body(router.clone(), "/repos/octocat/app/report?format=text").await;
    assert_eq!(body, "octocat/app: 1 outdated dependency\n  left-pad  ^1.0.0 -> 2.0.0");

    let (_, body) = get_body(router, "/repos/octocat/app/status").await;
    assert_eq!(body, r#"{"status":"outdated"}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn commit_is_acknowledged_even_when_resolution_fails() {
    let (store, router) = create_test_router(FakeHost::new(), FakeRegistry::new());

    let response = router.clone().oneshot(push_event("octocat", "missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_empty());

    let (status, body) = get_body(router, "/repos/octocat/missing/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"up to date"}"#);
}

#[tokio::test]
async fn commit_without_repository_is_rejected() {
    let (_store, router) = create_test_router(FakeHost::new(), FakeRegistry::new());

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/commit")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"zen": "Keep it logically awesome."}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
