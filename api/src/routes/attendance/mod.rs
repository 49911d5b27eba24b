//! `/api/attendance/sessions/{session_id}/...`
//!
//! - GET  `/sessions/{session_id}`              – session view
//! - POST `/sessions/{session_id}/close`        – manual close
//! - POST `/sessions/{session_id}/keys`         – issue a second-phase key
//! - POST `/sessions/{session_id}/keys/verify`  – check a second-phase key

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

mod common;
mod get;
mod post;

pub use common::{IssueKeyReq, KeyResponse, SessionResponse, VerifyKeyReq, VerifyKeyResponse};
pub use get::get_session;
pub use post::{close_session, issue_key, verify_key};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/{session_id}", get(get_session))
        .route("/sessions/{session_id}/close", post(close_session))
        .route("/sessions/{session_id}/keys", post(issue_key))
        .route("/sessions/{session_id}/keys/verify", post(verify_key))
}
