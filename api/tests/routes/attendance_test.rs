use crate::helpers::{local, make_test_app};
use axum::http::StatusCode;
use chrono::Duration;
use db::models::attendance_session::SessionStatus;
use db::test_utils::seed_session;
use serde_json::json;

#[tokio::test]
async fn get_session_reflects_due_activation() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 50, SessionStatus::Future, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 5));

    let (status, json) = app
        .request("GET", &format!("/api/attendance/sessions/{}", s.id), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["is_active"], true);
    assert_eq!(json["data"]["starts_at"], "2025-09-08T06:00:00Z");
    assert_eq!(json["data"]["ends_at"], "2025-09-08T06:50:00Z");
    assert!(json["data"]["closed_at"].is_null());
}

#[tokio::test]
async fn request_trigger_is_debounced() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 1, SessionStatus::Future, local(7, 0, 0)).await;
    let uri = format!("/api/attendance/sessions/{}", s.id);

    app.clock.set(local(9, 0, 5));
    let (_, json) = app.request("GET", &uri, None).await;
    assert_eq!(json["data"]["status"], "active");

    // Window is over but the last pass was 85 s ago.
    app.clock.set(local(9, 1, 30));
    let (_, json) = app.request("GET", &uri, None).await;
    assert_eq!(json["data"]["status"], "active");

    app.clock.set(local(9, 2, 10));
    let (_, json) = app.request("GET", &uri, None).await;
    assert_eq!(json["data"]["status"], "expired");
    assert_eq!(json["data"]["is_active"], false);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = make_test_app().await;

    let (status, json) = app.request("GET", "/api/attendance/sessions/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Attendance session not found");
}

#[tokio::test]
async fn close_session_then_reject_second_close() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 50, SessionStatus::Active, local(7, 0, 0)).await;
    let uri = format!("/api/attendance/sessions/{}/close", s.id);
    app.clock.set(local(9, 10, 0));

    let (status, json) = app.request("POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "closed");
    assert_eq!(json["data"]["is_active"], false);
    assert_eq!(json["data"]["closed_at"], "2025-09-08T06:10:00Z");

    let (status, json) = app.request("POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn future_session_cannot_be_closed() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 50, SessionStatus::Future, local(7, 0, 0)).await;

    let (status, _) = app
        .request("POST", &format!("/api/attendance/sessions/{}/close", s.id), None)
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn closed_session_survives_later_passes() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 50, SessionStatus::Active, local(7, 0, 0)).await;
    app.request("POST", &format!("/api/attendance/sessions/{}/close", s.id), None)
        .await;

    app.clock.set(local(12, 0, 0));
    let (_, json) = app
        .request("GET", &format!("/api/attendance/sessions/{}", s.id), None)
        .await;

    assert_eq!(json["data"]["status"], "closed");
}

#[tokio::test]
async fn issue_and_verify_second_phase_key() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 240, SessionStatus::Active, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 0));

    let (status, json) = app
        .request("POST", &format!("/api/attendance/sessions/{}/keys", s.id), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let key = json["data"]["key"].as_str().unwrap().to_owned();
    assert_eq!(key.len(), 64);
    assert_eq!(json["data"]["valid_until"], "2025-09-08T06:00:30Z");

    let verify_uri = format!("/api/attendance/sessions/{}/keys/verify", s.id);
    let (status, json) = app
        .request("POST", &verify_uri, Some(json!({ "key": key })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["verdict"], "valid");

    app.clock.advance(Duration::seconds(31));
    let (_, json) = app
        .request("POST", &verify_uri, Some(json!({ "key": key })))
        .await;
    assert_eq!(json["data"]["verdict"], "grace");

    let (_, json) = app
        .request("POST", &verify_uri, Some(json!({ "key": "0".repeat(64) })))
        .await;
    assert_eq!(json["data"]["verdict"], "unknown");
}

#[tokio::test]
async fn requested_ttl_is_clamped() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 240, SessionStatus::Active, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 0));

    let (_, json) = app
        .request(
            "POST",
            &format!("/api/attendance/sessions/{}/keys", s.id),
            Some(json!({ "ttl_seconds": 1 })),
        )
        .await;

    assert_eq!(json["data"]["valid_until"], "2025-09-08T06:00:05Z");
}

#[tokio::test]
async fn oversized_ttl_is_clamped_not_rejected() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 240, SessionStatus::Active, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 0));

    let (status, json) = app
        .request(
            "POST",
            &format!("/api/attendance/sessions/{}/keys", s.id),
            Some(json!({ "ttl_seconds": i64::MAX })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["valid_until"], "2025-09-08T06:05:00Z");
}

#[tokio::test]
async fn bodyless_issue_uses_default_ttl() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 240, SessionStatus::Active, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 0));

    let (status, json) = app
        .request("POST", &format!("/api/attendance/sessions/{}/keys", s.id), None)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["valid_until"], "2025-09-08T06:00:30Z");
}

#[tokio::test]
async fn keys_require_an_active_session() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 50, SessionStatus::Future, local(7, 0, 0)).await;

    let (status, json) = app
        .request("POST", &format!("/api/attendance/sessions/{}/keys", s.id), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);

    let (status, _) = app
        .request("POST", "/api/attendance/sessions/999/keys", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn verify_after_close_reports_session_inactive() {
    let app = make_test_app().await;
    let s = seed_session(&app.db, "09:00", 240, SessionStatus::Active, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 0));

    let (_, json) = app
        .request("POST", &format!("/api/attendance/sessions/{}/keys", s.id), Some(json!({})))
        .await;
    let key = json["data"]["key"].as_str().unwrap().to_owned();
    app.request("POST", &format!("/api/attendance/sessions/{}/close", s.id), None)
        .await;

    let (status, json) = app
        .request(
            "POST",
            &format!("/api/attendance/sessions/{}/keys/verify", s.id),
            Some(json!({ "key": key })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["verdict"], "session_inactive");
}
