//! services/api/src/web/middleware.rs
//!
//! Access-gate middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::{auth::session_token_from_headers, state::AppState};

/// Middleware that checks the gate session cookie against the issued tokens.
///
/// When the gate is not configured, every request passes through untouched.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !state.config.access_gate_enabled() {
        return Ok(next.run(req).await);
    }

    let token =
        session_token_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    if !state.access_tokens.lock().await.contains(&token) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}
