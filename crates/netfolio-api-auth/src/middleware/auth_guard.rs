//! Session auth guard.
//!
//! Verifies the `x-auth-token` header and attaches the resolved [`UserId`]
//! to request extensions for downstream handlers. Fails closed with
//! distinguishable 401s for a missing versus an invalid token.

use crate::error::ApiAuthError;
use crate::services::token_service::TokenService;
use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Session authentication middleware.
///
/// Expects an `Arc<TokenService>` extension layered at the application
/// level. Routes behind this guard can extract `Extension<UserId>`.
pub async fn auth_guard(mut request: Request<Body>, next: Next) -> Result<Response, Response> {
    let token_service = request
        .extensions()
        .get::<Arc<TokenService>>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("TokenService extension not configured");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error").into_response()
        })?;

    let token = request
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiAuthError::MissingAuthToken.into_response())?;

    let user_id = token_service.verify_session(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        ApiAuthError::InvalidAuthToken.into_response()
    })?;

    request.extensions_mut().insert(user_id);

    Ok(next.run(request).await)
}
