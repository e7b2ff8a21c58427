//! Authenticated account lookup handler.

use crate::error::ApiAuthError;
use crate::models::AccountResponse;
use crate::services::AccountService;
use axum::{Extension, Json};
use netfolio_core::UserId;
use std::sync::Arc;

/// Return the account behind the presented session token.
///
/// Guarded by [`crate::middleware::auth_guard`], which puts the verified
/// [`UserId`] into request extensions. The password hash and outstanding
/// token values are never included.
#[utoipa::path(
    get,
    path = "/api/auth",
    responses(
        (status = 200, description = "The authenticated account", body = AccountResponse),
        (status = 401, description = "Missing or invalid session token"),
    ),
    security(("session_token" = [])),
    tag = "Auth"
)]
pub async fn current_user_handler(
    Extension(accounts): Extension<Arc<AccountService>>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<AccountResponse>, ApiAuthError> {
    let user = accounts.current_user(user_id).await?;

    Ok(Json(AccountResponse::from(user)))
}
