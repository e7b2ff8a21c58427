//! Registration endpoint handler.

use crate::error::ApiAuthError;
use crate::models::{RegisterRequest, TokenResponse};
use crate::services::AccountService;
use axum::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

/// Register a new account.
///
/// The account starts inactive; an activation link is emailed. The response
/// carries a session token so the client is signed in immediately.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, session token returned", body = TokenResponse),
        (status = 400, description = "Validation failure or email already registered"),
    ),
    tag = "Users"
)]
pub async fn register_handler(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiAuthError> {
    request.validate()?;

    let token = accounts.register(&request).await?;

    Ok(Json(TokenResponse { token }))
}
