//! `OpenAPI` documentation for the netfolio API.
//!
//! Aggregates the annotated handlers from the endpoint crates into one
//! document, served as plain JSON at `/api-docs/openapi.json`.

use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::health::HealthResponse;

/// Registers the `x-auth-token` header scheme guarded routes reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "session_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-auth-token"))),
        );
    }
}

/// `OpenAPI` documentation for the netfolio API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "netfolio API",
        version = "0.1.0",
        description = "Account lifecycle and authentication API for netfolio"
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Users", description = "Registration, activation, password reset"),
        (name = "Auth", description = "Login, federated login, session introspection")
    ),
    paths(
        crate::health::health_handler,
        netfolio_api_auth::handlers::register::register_handler,
        netfolio_api_auth::handlers::activate::activate_handler,
        netfolio_api_auth::handlers::password_reset::reset_request_handler,
        netfolio_api_auth::handlers::password_reset::reset_verify_handler,
        netfolio_api_auth::handlers::login::login_handler,
        netfolio_api_auth::handlers::current_user::current_user_handler,
        netfolio_api_social::handlers::google_login_handler,
    ),
    components(schemas(
        HealthResponse,
        netfolio_api_auth::models::RegisterRequest,
        netfolio_api_auth::models::LoginRequest,
        netfolio_api_auth::models::ResetRequestBody,
        netfolio_api_auth::models::ResetVerifyBody,
        netfolio_api_auth::models::TokenResponse,
        netfolio_api_auth::models::MessageResponse,
        netfolio_api_auth::models::AccountResponse,
        netfolio_api_social::handlers::GoogleLoginRequest,
    ))
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json`.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/users",
            "/api/users/activate/{activation_token}",
            "/api/users/password/reset/request",
            "/api/users/password/reset/verify/{password_reset_token}",
            "/api/auth",
            "/api/auth/google",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path: {path}"
            );
        }
    }

    #[test]
    fn document_declares_the_header_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("session_token"));
    }

    #[test]
    fn document_serializes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("document serializes");
        assert_eq!(json["info"]["title"], "netfolio API");
    }
}
