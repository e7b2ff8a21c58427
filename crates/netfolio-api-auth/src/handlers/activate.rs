//! Account activation endpoint handler.

use crate::error::ApiAuthError;
use crate::models::MessageResponse;
use crate::services::AccountService;
use axum::extract::Path;
use axum::{Extension, Json};
use std::sync::Arc;

/// Consume an activation token.
///
/// Reached through the link in the activation email. A consumed or
/// otherwise invalid token always fails the same way.
#[utoipa::path(
    get,
    path = "/api/users/activate/{activation_token}",
    params(("activation_token" = String, Path, description = "Activation token from the email link")),
    responses(
        (status = 200, description = "Account activated", body = MessageResponse),
        (status = 400, description = "Invalid token or already active account"),
    ),
    tag = "Users"
)]
pub async fn activate_handler(
    Extension(accounts): Extension<Arc<AccountService>>,
    Path(activation_token): Path<String>,
) -> Result<Json<MessageResponse>, ApiAuthError> {
    accounts.activate(&activation_token).await?;

    Ok(Json(MessageResponse::new("Activation Success")))
}
