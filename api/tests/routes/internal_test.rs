use crate::helpers::{local, make_test_app};
use axum::http::StatusCode;
use db::models::attendance_session::SessionStatus;
use db::test_utils::seed_session;
use serial_test::serial;
use util::config::AppConfig;

#[tokio::test]
#[serial]
async fn run_maintenance_forces_a_pass() {
    let app = make_test_app().await;
    seed_session(&app.db, "09:00", 50, SessionStatus::Future, local(7, 0, 0)).await;
    app.clock.set(local(9, 0, 0));

    let (status, json) = app.request("POST", "/internal/run-maintenance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["activated_count"], 1);
    assert_eq!(json["data"]["truncated"], false);

    // Forced passes ignore the debounce; nothing is left to do.
    let (status, json) = app.request("POST", "/internal/run-maintenance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["activated_count"], 0);
}

#[tokio::test]
#[serial]
async fn internal_routes_are_hidden_in_production() {
    AppConfig::set_env("production");
    let app = make_test_app().await;
    AppConfig::reset();

    let (status, _) = app.request("POST", "/internal/run-maintenance", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
