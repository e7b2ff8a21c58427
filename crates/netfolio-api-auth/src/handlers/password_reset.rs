//! Password reset endpoint handlers.

use crate::error::ApiAuthError;
use crate::models::{MessageResponse, ResetRequestBody, ResetVerifyBody};
use crate::services::AccountService;
use axum::extract::Path;
use axum::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

/// Request a password reset link.
///
/// Responds 404 when no account has this email. That reveals account
/// existence; it is this endpoint's documented contract, unlike login.
#[utoipa::path(
    post,
    path = "/api/users/password/reset/request",
    request_body = ResetRequestBody,
    responses(
        (status = 200, description = "Reset link dispatched", body = MessageResponse),
        (status = 404, description = "No account with this email"),
    ),
    tag = "Users"
)]
pub async fn reset_request_handler(
    Extension(accounts): Extension<Arc<AccountService>>,
    Json(request): Json<ResetRequestBody>,
) -> Result<Json<MessageResponse>, ApiAuthError> {
    request.validate()?;

    accounts.request_password_reset(&request.email).await?;

    Ok(Json(MessageResponse::new(
        "Success, Please Check Your Email",
    )))
}

/// Consume a reset token and install a new password.
#[utoipa::path(
    post,
    path = "/api/users/password/reset/verify/{password_reset_token}",
    params(("password_reset_token" = String, Path, description = "Reset token from the email link")),
    request_body = ResetVerifyBody,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Validation failure or invalid token"),
    ),
    tag = "Users"
)]
pub async fn reset_verify_handler(
    Extension(accounts): Extension<Arc<AccountService>>,
    Path(password_reset_token): Path<String>,
    Json(request): Json<ResetVerifyBody>,
) -> Result<Json<MessageResponse>, ApiAuthError> {
    request.validate()?;

    accounts
        .verify_password_reset(&password_reset_token, &request.password)
        .await?;

    Ok(Json(MessageResponse::new("You Password has Been Updated")))
}
