//! HTTP surface of the attendance engine.
//!
//! Every `/api` request passes through the lazy maintenance trigger before
//! its handler runs, so the sessions it reads are already up to date.

pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use util::config;

use crate::middleware::{log_request, run_lazy_maintenance};
use crate::routes::{internal::internal_routes, routes};
use crate::state::AppState;

/// Builds the full application router.
///
/// `/internal` is only mounted outside production.
pub fn build_app(state: AppState) -> Router {
    let mut router: Router<AppState> = Router::new().nest(
        "/api",
        routes().layer(from_fn_with_state(state.clone(), run_lazy_maintenance)),
    );

    let env = config::env().to_lowercase();
    if env != "production" {
        router = router.nest("/internal", internal_routes());
        tracing::info!("[dev/test] Mounted /internal routes (env = {env})");
    } else {
        tracing::info!("[prod] Skipping /internal routes");
    }

    router.layer(from_fn(log_request)).with_state(state)
}
