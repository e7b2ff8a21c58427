//! Password login endpoint handler.

use crate::error::ApiAuthError;
use crate::models::{LoginRequest, TokenResponse};
use crate::services::AccountService;
use axum::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, session token returned", body = TokenResponse),
        (status = 400, description = "Validation failure, bad credentials, or inactive account"),
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiAuthError> {
    request.validate()?;

    let token = accounts.login(&request.email, &request.password).await?;

    Ok(Json(TokenResponse { token }))
}
