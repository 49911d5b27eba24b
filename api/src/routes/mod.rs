//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe
//! - `/attendance` → session lookup, manual close, second-phase keys
//!
//! The operational `/internal` group lives in [`internal`] and is mounted by
//! [`crate::build_app`] outside of `/api`, so it skips the lazy trigger.

use axum::Router;

use crate::routes::{attendance::attendance_routes, health::health_routes};
use crate::state::AppState;

pub mod attendance;
pub mod health;
pub mod internal;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/attendance", attendance_routes())
}
