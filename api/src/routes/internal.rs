//! Operational routes, mounted under `/internal` in non-production envs only.
//!
//! - POST `/internal/run-maintenance` – run a maintenance pass now, ignoring
//!   the debounce interval.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use services::error::MaintenanceError;
use services::maintenance::MaintenanceSummary;

use crate::response::ApiResponse;
use crate::state::AppState;

pub fn internal_routes() -> Router<AppState> {
    Router::new().route("/run-maintenance", post(run_maintenance))
}

/// **Responses**: `200` pass summary, `409` a pass is already running in this
/// process, `500` the pass failed and was rolled back.
pub async fn run_maintenance(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<MaintenanceSummary>>) {
    match state.trigger().force(state.db(), state.now()).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(ApiResponse::success(summary, "Maintenance pass complete")),
        ),
        Err(MaintenanceError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("A maintenance pass is already running")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Forced maintenance pass failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Maintenance pass failed")),
            )
        }
    }
}
