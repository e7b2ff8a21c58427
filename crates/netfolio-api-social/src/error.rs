//! Federated login error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use netfolio_auth::AuthError;
use serde::Serialize;
use thiserror::Error;

/// Federated login errors.
#[derive(Debug, Error)]
pub enum SocialError {
    /// The ID token failed verification: bad signature, wrong audience or
    /// issuer, expired, or missing required claims.
    #[error("ID token verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// Google's JWKS endpoint could not be fetched or parsed.
    #[error("JWKS fetch failed: {reason}")]
    JwksFetchFailed { reason: String },

    /// Database fault.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session token issuance fault.
    #[error("Token issuance failed: {0}")]
    TokenIssuance(#[from] AuthError),
}

#[derive(Debug, Serialize)]
struct MsgResponse {
    msg: String,
}

fn msg_response(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(MsgResponse {
            msg: msg.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for SocialError {
    fn into_response(self) -> Response {
        match &self {
            // An unverifiable token is an authentication failure, not a
            // server fault. Detail stays in the log.
            SocialError::VerificationFailed { reason } => {
                tracing::warn!(reason = %reason, "Google ID token rejected");
                msg_response(StatusCode::UNAUTHORIZED, "Token is not valid")
            }
            SocialError::JwksFetchFailed { reason } => {
                tracing::error!(reason = %reason, "Google JWKS unavailable");
                msg_response(StatusCode::BAD_GATEWAY, "Identity provider unavailable")
            }
            SocialError::Database(e) => {
                tracing::error!(error = %e, "Database error during federated login");
                msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
            SocialError::TokenIssuance(e) => {
                tracing::error!(error = %e, "Session issuance failed after federated login");
                msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}
