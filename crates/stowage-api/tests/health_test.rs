//! Health, readiness and documentation endpoint tests.
//!
//! Run with: `cargo test -p stowage-api --test health_test`

mod helpers;

use axum::http::StatusCode;
use helpers::setup_test_app;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "healthy");
}

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app().await;

    let response = app.client().get("/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_leaves_store_untouched() {
    let app = setup_test_app().await;

    let response = app.client().get("/ready").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ready");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_readiness_fails_when_directory_is_gone() {
    let app = setup_test_app().await;
    std::fs::remove_dir_all(app.upload_dir()).unwrap();

    let response = app.client().get("/ready").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/upload"]["post"].is_object());
    assert!(body["paths"]["/static/uploads/{key}"]["get"].is_object());
}

#[tokio::test]
async fn test_request_id_header_on_every_response() {
    let app = setup_test_app().await;

    let response = app.client().get("/live").await;
    assert!(response.headers().get("X-Request-ID").is_some());

    let response = app
        .client()
        .get("/live")
        .add_header("X-Request-ID", "caller-supplied-id")
        .await;
    assert_eq!(response.header("X-Request-ID"), "caller-supplied-id");
}
