use std::sync::Arc;

use api::{build_app, state::AppState};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use services::keys::KeyService;
use services::lifecycle::LifecycleRules;
use services::maintenance::MaintenancePass;
use services::trigger::LazyTrigger;
use tower::ServiceExt;
use util::clock::FixedClock;

/// 2025-09-08 at the given local (UTC+3) time.
pub fn local(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 9, 8, h, m, s)
        .unwrap()
        .with_timezone(&Utc)
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub clock: FixedClock,
}

impl TestApp {
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

/// In-memory database, UTC+3 rules, a 120 s debounce and a clock pinned at
/// 07:00 local on the seed date.
pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;
    let clock = FixedClock::new(local(7, 0, 0));

    let rules = LifecycleRules::new(FixedOffset::east_opt(3 * 3600).unwrap());
    let trigger = LazyTrigger::new(MaintenancePass::new(rules), Duration::seconds(120));
    let keys = KeyService::new(30, Duration::hours(1));

    let state = AppState::new(db.clone(), Arc::new(clock.clone()), Arc::new(trigger), keys);

    TestApp {
        router: build_app(state),
        db,
        clock,
    }
}
