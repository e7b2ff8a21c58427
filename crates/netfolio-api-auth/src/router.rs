//! Route tables for the account lifecycle endpoints.
//!
//! - POST /api/users — register
//! - GET  /api/users/activate/:activation_token — activate
//! - POST /api/users/password/reset/request — request reset link
//! - POST /api/users/password/reset/verify/:password_reset_token — set new password
//! - POST /api/auth — login
//! - GET  /api/auth — current account (guarded)
//!
//! The application layers `Extension<Arc<AccountService>>` and
//! `Extension<Arc<TokenService>>` over the assembled router.

use crate::handlers::{
    activate_handler, current_user_handler, login_handler, register_handler, reset_request_handler,
    reset_verify_handler,
};
use crate::middleware::auth_guard;
use axum::handler::Handler;
use axum::routing::{get, post};
use axum::{middleware, Router};

/// Routes under `/api/users`: registration, activation, password reset.
/// All public.
pub fn users_router() -> Router {
    Router::new()
        .route("/api/users", post(register_handler))
        .route("/api/users/activate/:activation_token", get(activate_handler))
        .route(
            "/api/users/password/reset/request",
            post(reset_request_handler),
        )
        .route(
            "/api/users/password/reset/verify/:password_reset_token",
            post(reset_verify_handler),
        )
}

/// Routes under `/api/auth`: login (public) and the guarded account lookup.
///
/// The guard wraps only the GET handler; login on the same path stays
/// public.
pub fn auth_router() -> Router {
    Router::new().route(
        "/api/auth",
        post(login_handler)
            .get(current_user_handler.layer(middleware::from_fn(auth_guard))),
    )
}
