use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::attendance_session::Model as Session;

use crate::response::ApiResponse;
use crate::state::AppState;

use super::common::SessionResponse;

/// GET `/api/attendance/sessions/{session_id}`
///
/// Returns the session with its scheduled window as RFC 3339 instants. The
/// lazy trigger has already run for this request, so `status` reflects any
/// due transition.
///
/// **Responses**: `200` session, `404` unknown id, `500` database error.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    match Session::find_by_id(state.db(), session_id).await {
        Ok(Some(session)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SessionResponse::from_model(session, state.trigger().pass().rules()),
                "Attendance session retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Attendance session not found")),
        ),
        Err(e) => {
            tracing::error!(session_id, error = %e, "Failed to load attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to load attendance session")),
            )
        }
    }
}
