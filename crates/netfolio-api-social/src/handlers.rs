//! Federated login endpoint handler.

use crate::error::SocialError;
use crate::services::GoogleAuthService;
use axum::{Extension, Json};
use netfolio_api_auth::models::TokenResponse;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Google login request payload: the ID token from Google Sign-In.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Authenticate with a Google ID token.
///
/// First login creates the local account; the response is the same
/// `{"token": ...}` as a password login.
#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Authenticated, session token returned", body = TokenResponse),
        (status = 401, description = "ID token failed verification"),
        (status = 502, description = "Google's keys could not be fetched"),
    ),
    tag = "Auth"
)]
pub async fn google_login_handler(
    Extension(google): Extension<Arc<GoogleAuthService>>,
    Json(request): Json<GoogleLoginRequest>,
) -> Result<Json<TokenResponse>, SocialError> {
    let token = google.login(&request.token).await?;

    Ok(Json(TokenResponse { token }))
}
