use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::attendance_session::Model as Session;
use sea_orm::DbErr;
use services::error::KeyError;

use crate::response::ApiResponse;
use crate::state::AppState;

use super::common::{IssueKeyReq, KeyResponse, SessionResponse, VerifyKeyReq, VerifyKeyResponse};

fn key_error_status(err: &KeyError) -> StatusCode {
    match err {
        KeyError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        KeyError::SessionNotActive(_) => StatusCode::CONFLICT,
        KeyError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST `/api/attendance/sessions/{session_id}/close`
///
/// Manually closes an `inactive` or `active` session. A closed session is
/// never touched by maintenance again.
///
/// **Responses**: `200` closed session, `404` unknown id, `409` session in
/// any other state, `500` database error.
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    match Session::close(state.db(), session_id, state.now()).await {
        Ok(session) => {
            tracing::info!(session_id, "Attendance session closed manually");
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    SessionResponse::from_model(session, state.trigger().pass().rules()),
                    "Attendance session closed",
                )),
            )
        }
        Err(DbErr::RecordNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Attendance session not found")),
        ),
        Err(DbErr::Custom(msg)) => (StatusCode::CONFLICT, Json(ApiResponse::error(msg))),
        Err(e) => {
            tracing::error!(session_id, error = %e, "Failed to close attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to close attendance session")),
            )
        }
    }
}

/// POST `/api/attendance/sessions/{session_id}/keys`
///
/// Body (optional): `{ "ttl_seconds"?: number }`, clamped to 5..=300. A bare
/// POST issues a key with the default TTL.
///
/// **Responses**: `201` issued key, `404` unknown id, `409` session not
/// active, `500` database error.
pub async fn issue_key(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    body: Option<Json<IssueKeyReq>>,
) -> (StatusCode, Json<ApiResponse<KeyResponse>>) {
    let ttl = body.and_then(|Json(req)| req.ttl_seconds);

    match state.keys().issue(state.db(), session_id, ttl, state.now()).await {
        Ok(key) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(KeyResponse::from(key), "Second-phase key issued")),
        ),
        Err(e) => {
            let status = key_error_status(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(session_id, error = %e, "Failed to issue second-phase key");
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// POST `/api/attendance/sessions/{session_id}/keys/verify`
///
/// Body: `{ "key": "<64 hex chars>" }`. Answers with a verdict
/// (`valid`, `grace`, `expired`, `unknown`, `session_inactive`); only an
/// unknown session or a database failure is an error.
pub async fn verify_key(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Json(body): Json<VerifyKeyReq>,
) -> (StatusCode, Json<ApiResponse<VerifyKeyResponse>>) {
    match state
        .keys()
        .verify(state.db(), session_id, body.key.trim(), state.now())
        .await
    {
        Ok(verdict) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                VerifyKeyResponse { verdict },
                "Second-phase key checked",
            )),
        ),
        Err(e) => {
            let status = key_error_status(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(session_id, error = %e, "Failed to verify second-phase key");
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}
