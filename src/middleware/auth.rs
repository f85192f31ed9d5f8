//! Authentication middleware
//!
//! Resolves the caller's bearer token through the identity service before
//! any provider call is made

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::handlers::AppState;
use crate::utils::error::{AppError, AppResult};

/// Require a valid session on every non-preflight request
///
/// The resolved user identity is attached to the request extensions for
/// downstream handlers.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    // Pre-flight requests are answered without an auth check
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".to_string()))?;

    let user = state.identity.verify_token(&token).await?;
    debug!("Authenticated request for user: {}", user.id);

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
