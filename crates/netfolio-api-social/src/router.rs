//! Route table for federated login.

use crate::handlers::google_login_handler;
use axum::routing::post;
use axum::Router;

/// `POST /api/auth/google`. The application layers
/// `Extension<Arc<GoogleAuthService>>` over the assembled router.
pub fn social_router() -> Router {
    Router::new().route("/api/auth/google", post(google_login_handler))
}
