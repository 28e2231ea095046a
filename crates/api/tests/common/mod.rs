#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use campus_api::auth::jwt::{generate_access_token, JwtConfig};
use campus_api::config::{ServerConfig, StorageBackend};
use campus_api::router::build_app_router;
use campus_api::state::AppState;
use campus_core::enrollment::ProgressStep;
use campus_db::models::class::{Class, CreateClass};
use campus_db::models::enrollment::{CreateEnrollment, Enrollment};
use campus_db::models::student::{CreateStudent, Student};
use campus_db::store::{MemoryStore, SchoolStore};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_ID: i64 = 1;
pub const TEACHER_ID: i64 = 7;
pub const STUDENT_USER_ID: i64 = 99;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage: StorageBackend::Memory,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over the given in-memory store.
///
/// Uses the same `build_app_router` as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn token_for(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation")
}

pub fn admin_token() -> String {
    token_for(ADMIN_ID, "admin")
}

pub fn teacher_token() -> String {
    token_for(TEACHER_ID, "teacher")
}

pub fn student_token() -> String {
    token_for(STUDENT_USER_ID, "student")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a raw (possibly malformed) JSON body.
pub async fn post_raw(app: Router, uri: &str, token: &str, raw: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Remove every `*_at` key so bodies from separate runs can be compared.
pub fn strip_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !key.ends_with("_at"));
            map.values_mut().for_each(strip_timestamps);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_timestamps),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn steps() -> Vec<ProgressStep> {
    ["orientation", "unit-1", "unit-2"]
        .iter()
        .enumerate()
        .map(|(i, name)| ProgressStep {
            name: name.to_string(),
            completed: i < 2,
            completed_at: None,
        })
        .collect()
}

pub async fn seed_student(store: &MemoryStore, first_name: &str) -> Student {
    store
        .create_student(&CreateStudent {
            first_name: first_name.to_string(),
            last_name: "Pupil".to_string(),
            email: None,
            grade_level: Some(10),
        })
        .await
        .unwrap()
}

pub async fn seed_class(store: &MemoryStore, name: &str, capacity: i32) -> Class {
    store
        .create_class(&CreateClass {
            name: name.to_string(),
            code: None,
            capacity,
        })
        .await
        .unwrap()
}

pub async fn seed_enrollment(store: &MemoryStore, student_id: i64, class_id: i64) -> Enrollment {
    store
        .enroll(&CreateEnrollment {
            student_id,
            class_id,
            status_id: None,
            steps: steps(),
        })
        .await
        .unwrap()
}

/// A student enrolled in `Algebra`, with an empty `Geometry` class to move to.
pub struct TransferFixture {
    pub student: Student,
    pub from: Class,
    pub to: Class,
    pub enrollment: Enrollment,
}

pub async fn seed_transfer(store: &MemoryStore, target_capacity: i32) -> TransferFixture {
    let student = seed_student(store, "Ada").await;
    let from = seed_class(store, "Algebra", 30).await;
    let to = seed_class(store, "Geometry", target_capacity).await;
    let enrollment = seed_enrollment(store, student.id, from.id).await;
    TransferFixture {
        student,
        from,
        to,
        enrollment,
    }
}
