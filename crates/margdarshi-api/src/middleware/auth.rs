//! Bearer token gate for protected routes

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use margdarshi_shared::constants::BEARER_PREFIX;

use crate::error::ApiError;
use crate::state::AppState;

/// Verify `Authorization: Bearer <token>` and put the claims into request
/// extensions for the handler.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    let claims = state.jwt.validate_token(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::Unauthorized("Not authorized, token failed".to_string())
    })?;

    debug!("Authenticated request for user {}", claims.sub);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
