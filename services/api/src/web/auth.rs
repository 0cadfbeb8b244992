//! services/api/src/web/auth.rs
//!
//! The optional access gate: a single username/password pair checked against
//! configured values before the rest of the interface is reachable. This is
//! deliberately not a real authentication system (no user store, no hashing);
//! it only keeps a shared deployment off the open internet.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub gate_enabled: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Pass the access gate.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access granted", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<axum::response::Response, (StatusCode, String)> {
    // With the gate disabled there is nothing to check and no cookie to issue.
    if !state.config.access_gate_enabled() {
        return Ok(
            (StatusCode::OK, Json(LoginResponse { gate_enabled: false })).into_response(),
        );
    }

    let expected_username = state.config.access_username.as_deref();
    let expected_password = state.config.access_password.as_deref();
    if Some(req.username.as_str()) != expected_username
        || Some(req.password.as_str()) != expected_password
    {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".to_string(),
        ));
    }

    let token = Uuid::new_v4().to_string();
    state.access_tokens.lock().await.insert(token.clone());
    info!("Access gate passed; session token issued.");

    let cookie = format!("session={token}; HttpOnly; SameSite=Lax; Path=/");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { gate_enabled: true }),
    )
        .into_response())
}

/// POST /auth/logout - Revoke the gate session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = session_token_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.access_tokens.lock().await.remove(&token);

    let cookie = "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// Extracts the gate session token from the `Cookie` header, if present.
pub fn session_token_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn session_token_parsing_handles_multiple_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; session=abc-123; lang=en".parse().unwrap(),
        );
        assert_eq!(
            session_token_from_headers(&headers).as_deref(),
            Some("abc-123")
        );

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark".parse().unwrap());
        assert!(session_token_from_headers(&headers).is_none());
    }
}
