// tests/e2e_smoke.rs
//
// Assembly-level smoke tests: build the Router through `app()` against the
// files shipped in the repo (config/, data/), the same way the binary does.
// Env-mutating, so serialized.

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use http::StatusCode;
use tower::ServiceExt; // for `oneshot` (tower 0.5 with features=["util"])

fn point_at_repo_files() {
    std::env::set_var("DATASET_PATH", "data/finance_content.json");
    std::env::set_var("AI_CONFIG_PATH", "config/ai.json");
    std::env::set_var("HEURISTICS_CONFIG_PATH", "config/heuristics.toml");
}

#[serial_test::serial]
#[tokio::test]
async fn smoke_stats_and_analyze_with_mock_provider() {
    point_at_repo_files();
    std::env::set_var("AI_TEST_MODE", "mock");

    let app = fincontent_analyzer::app()
        .await
        .expect("app() should build against repo files");

    // GET /stats over the shipped dataset
    let req = Request::builder()
        .method("GET")
        .uri("/stats")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let s = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(s.contains("\"total_videos\":14"), "body: {s}");

    // POST /analyze flows through the mock provider
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"title":"How to Build an Emergency Fund Fast"}"#,
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let s = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(s.contains("\"score\":72"), "mock provider score; body: {s}");

    std::env::remove_var("AI_TEST_MODE");
}

#[serial_test::serial]
#[tokio::test]
async fn smoke_strict_without_credential_refuses_to_start() {
    point_at_repo_files();
    std::env::remove_var("AI_TEST_MODE");
    std::env::remove_var("GEMINI_API_KEY");

    // config/ai.json ships strict + "api_key": "ENV", so assembly must fail
    // loudly instead of serving requests that can only 503.
    let err = fincontent_analyzer::app()
        .await
        .expect_err("strict mode without a credential must refuse to start");
    assert!(
        err.to_string().contains("GEMINI_API_KEY"),
        "error should name the missing credential, got: {err}"
    );
}
