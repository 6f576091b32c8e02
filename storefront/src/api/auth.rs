//! Admin bearer-token authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::header::AUTHORIZATION;
use shared::error::AppError;

use crate::core::AppState;

/// Middleware guarding admin routes with `Authorization: Bearer <ADMIN_TOKEN>`
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    if !tokens_match(token.trim(), &state.config.admin_token) {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request with wrong token");
        return Err(AppError::invalid_token("Invalid admin token"));
    }

    Ok(next.run(request).await)
}

/// Comparison whose duration does not depend on where the inputs differ
fn tokens_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
