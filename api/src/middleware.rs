use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::state::AppState;

/// Gives the maintenance pass a chance to run before the handler sees the
/// request. The pass only runs when its interval has elapsed; failures are
/// logged by the trigger and never reach the caller.
pub async fn run_lazy_maintenance(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(summary) = state.trigger().fire(state.db(), state.now()).await {
        tracing::debug!(
            path = %req.uri().path(),
            transitions = summary.transitions(),
            "Request triggered maintenance pass"
        );
    }

    next.run(req).await
}

/// Logs method, path, status and latency for each request. CORS preflight
/// `OPTIONS` requests are passed through silently.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        method = ?method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );

    response
}
