//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use carehook_api::config::EventsLimit;
use carehook_api::state::AppState;
use carehook_core::clock::Clock;
use carehook_core::repository::EventStore;
use carehook_core::schema::ValidationSchema;
use carehook_core::validation::Validator;
use carehook_event_store::SqliteEventStore;
use carehook_test_support::SequenceClock;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a real `SqliteEventStore` in a temporary directory. Keep
/// the value alive for the duration of the test.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteEventStore>,
    _dir: TempDir,
}

/// Clock used across all integration tests: starts at 2026-01-15T10:00:00Z
/// and advances one second per reading.
fn test_clock() -> Arc<dyn Clock> {
    Arc::new(SequenceClock::new(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
        chrono::Duration::seconds(1),
    ))
}

/// Build the full app router with the default schema.
pub async fn build_test_app() -> TestApp {
    build_test_app_with_schema(ValidationSchema::default()).await
}

/// Build the full app router with a custom schema. Uses the same route
/// structure as `main.rs`.
pub async fn build_test_app_with_schema(schema: ValidationSchema) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("appointments.db").display());
    let clock = test_clock();
    let store = Arc::new(SqliteEventStore::connect(&url, 5, clock.clone()).await.unwrap());
    store.initialize().await.unwrap();

    let state = AppState::new(
        clock,
        Arc::new(Validator::new(schema)),
        store.clone(),
        EventsLimit::default(),
    );

    TestApp {
        router: carehook_api::app(state),
        store,
        _dir: dir,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, serde_json::to_vec(body).unwrap()).await
}

/// Send a POST request with an arbitrary body and return the response.
pub async fn post_raw(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
