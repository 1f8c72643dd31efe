//! Integration tests for the event listing endpoint.

mod common;

use axum::http::StatusCode;
use carehook_core::repository::EventStore;
use serde_json::json;

async fn deliver(app: &common::TestApp, appointment_id: &str) {
    let payload = json!({
        "event_type": "appointment.updated",
        "appointment_id": appointment_id,
        "patient_id": "P1",
        "timestamp": "2025-02-01T08:00:00Z",
    });
    let (status, _) =
        common::post_json(app.router.clone(), "/webhook/appointments", &payload).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_store_returns_empty_array() {
    let app = common::build_test_app().await;

    let (status, json) = common::get_json(app.router.clone(), "/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "count": 0, "events": [] }));
}

#[tokio::test]
async fn test_events_are_listed_newest_first() {
    let app = common::build_test_app().await;
    for id in ["E1", "E2", "E3"] {
        deliver(&app, id).await;
    }

    let (_, json) = common::get_json(app.router.clone(), "/events").await;

    let order: Vec<&str> = json["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["appointment_id"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["E3", "E2", "E1"]);
    assert_eq!(json["count"], 3);
}

#[tokio::test]
async fn test_limit_caps_result_size() {
    let app = common::build_test_app().await;
    for id in ["E1", "E2", "E3"] {
        deliver(&app, id).await;
    }

    let (status, json) = common::get_json(app.router.clone(), "/events?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["events"][0]["appointment_id"], "E3");
}

#[tokio::test]
async fn test_absent_notes_serialize_as_null() {
    let app = common::build_test_app().await;
    deliver(&app, "E1").await;

    let (_, json) = common::get_json(app.router.clone(), "/events").await;

    assert!(json["events"][0]["notes"].is_null());
}

#[tokio::test]
async fn test_invalid_limit_returns_400() {
    let app = common::build_test_app().await;

    for uri in ["/events?limit=0", "/events?limit=-1", "/events?limit=abc"] {
        let (status, json) = common::get_json(app.router.clone(), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"], "Invalid limit");
    }
}

#[tokio::test]
async fn test_closed_store_returns_500() {
    let app = common::build_test_app().await;
    app.store.close().await;

    let (status, json) = common::get_json(app.router.clone(), "/events").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to retrieve events");
}
