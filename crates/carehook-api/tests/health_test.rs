//! Integration tests for the health endpoint.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_returns_200_with_service_status() {
    let app = common::build_test_app().await;

    let (status, json) = common::get_json(app.router.clone(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["service"], "Healthcare Appointment Webhook");
    assert_eq!(json["status"], "running");
    assert_eq!(json["timestamp"], "2026-01-15T10:00:00.000000Z");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app().await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
