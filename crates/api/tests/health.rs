//! Tests for the root-level health endpoint and shared middleware.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use campus_db::store::MemoryStore;
use common::{body_json, build_test_app};
use tower::ServiceExt;

#[tokio::test]
async fn health_returns_ok_without_auth() {
    let app = build_test_app(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let app = build_test_app(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
