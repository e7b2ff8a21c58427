//! Account lifecycle error types and their HTTP representations.
//!
//! The response shapes are part of the endpoint contract:
//!
//! - validation, duplicate account, bad credentials, inactive account:
//!   `400 {"errors":[{"msg":...,"param":...}]}`
//! - activation failure: `400 {"msg":"Activation Failed","error":...}`
//! - reset request for an unknown email:
//!   `404 {"msg":"Password Reset Request Failed","error":"User Not Found"}`
//! - auth guard: `401 {"msg":...}`
//!
//! Database and other internal faults collapse to a generic 500 and are
//! logged server-side only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use netfolio_auth::AuthError;
use serde::Serialize;
use thiserror::Error;

/// One entry of a `{"errors":[...]}` payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Human-readable message.
    pub msg: String,

    /// The offending field, when the error is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl FieldError {
    /// Error message without an associated field.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: None,
        }
    }

    /// Error message tied to a request field.
    #[must_use]
    pub fn for_field(msg: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: Some(param.into()),
        }
    }
}

/// Why an activation attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFailure {
    /// Signature invalid, expired, unknown email, or stale token.
    InvalidToken,
    /// The account is already active.
    AlreadyActive,
}

impl ActivationFailure {
    fn as_str(self) -> &'static str {
        match self {
            ActivationFailure::InvalidToken => "Invalid Token",
            ActivationFailure::AlreadyActive => "Already Active User",
        }
    }
}

/// Account lifecycle errors.
#[derive(Debug, Error)]
pub enum ApiAuthError {
    /// Request body failed validation; one entry per violated field.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// An account with this email already exists.
    #[error("User already exists")]
    DuplicateAccount,

    /// Unknown email or wrong password. Deliberately non-specific.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Correct credentials but the account has not been activated.
    #[error("Account not activated")]
    AccountNotActive,

    /// Activation rejected.
    #[error("Activation failed: {}", .0.as_str())]
    ActivationFailed(ActivationFailure),

    /// Password reset requested for an email with no account.
    ///
    /// This endpoint intentionally reveals account existence; see the
    /// router documentation.
    #[error("Password reset requested for unknown account")]
    ResetAccountNotFound,

    /// Password reset token invalid, expired, stale, or for an unknown email.
    #[error("Invalid password reset token")]
    InvalidResetToken,

    /// No `x-auth-token` header on a guarded route.
    #[error("Missing auth token")]
    MissingAuthToken,

    /// The presented session token failed verification.
    #[error("Invalid auth token")]
    InvalidAuthToken,

    /// Token or hashing fault outside a contract-mapped path.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database fault.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else unexpected.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// `{"msg": ...}` payload used by the guard and the generic 500.
#[derive(Debug, Serialize)]
struct MsgResponse {
    msg: String,
}

/// `{"msg": ..., "error": ...}` payload used by activation and reset-request.
#[derive(Debug, Serialize)]
struct MsgErrorResponse {
    msg: String,
    error: String,
}

/// `{"errors": [...]}` payload.
#[derive(Debug, Serialize)]
struct ErrorsResponse {
    errors: Vec<FieldError>,
}

fn errors_response(status: StatusCode, errors: Vec<FieldError>) -> Response {
    (status, Json(ErrorsResponse { errors })).into_response()
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

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        match self {
            ApiAuthError::Validation(errors) => errors_response(StatusCode::BAD_REQUEST, errors),
            ApiAuthError::DuplicateAccount => errors_response(
                StatusCode::BAD_REQUEST,
                vec![FieldError::new("User already exists!")],
            ),
            ApiAuthError::InvalidCredentials => errors_response(
                StatusCode::BAD_REQUEST,
                vec![FieldError::new("Invalid credentials")],
            ),
            ApiAuthError::AccountNotActive => errors_response(
                StatusCode::BAD_REQUEST,
                vec![FieldError::new(
                    "Account is Not Active, Please Check Your Email",
                )],
            ),
            ApiAuthError::ActivationFailed(reason) => (
                StatusCode::BAD_REQUEST,
                Json(MsgErrorResponse {
                    msg: "Activation Failed".to_string(),
                    error: reason.as_str().to_string(),
                }),
            )
                .into_response(),
            ApiAuthError::ResetAccountNotFound => (
                StatusCode::NOT_FOUND,
                Json(MsgErrorResponse {
                    msg: "Password Reset Request Failed".to_string(),
                    error: "User Not Found".to_string(),
                }),
            )
                .into_response(),
            ApiAuthError::InvalidResetToken => (
                StatusCode::BAD_REQUEST,
                Json(MsgErrorResponse {
                    msg: "Password Reset Failed".to_string(),
                    error: "Invalid Token".to_string(),
                }),
            )
                .into_response(),
            ApiAuthError::MissingAuthToken => msg_response(
                StatusCode::UNAUTHORIZED,
                "No JSON Web Token found, authorization denied.",
            ),
            ApiAuthError::InvalidAuthToken => {
                msg_response(StatusCode::UNAUTHORIZED, "Token is not valid")
            }
            ApiAuthError::Auth(e) => {
                tracing::error!(error = %e, "Unhandled auth error");
                msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
            ApiAuthError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
            ApiAuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiAuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut entries: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map_or_else(|| format!("Invalid value for {field}"), |m| m.to_string());
                    FieldError::for_field(msg, field)
                })
            })
            .collect();
        // field_errors() iterates a HashMap; sort for a stable payload order
        entries.sort_by(|a, b| a.param.cmp(&b.param).then_with(|| a.msg.cmp(&b.msg)));
        Self::Validation(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_payload_shape() {
        let err = ApiAuthError::Validation(vec![FieldError::for_field(
            "Please include a valid email",
            "email",
        )]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["msg"], "Please include a valid email");
        assert_eq!(json["errors"][0]["param"], "email");
    }

    #[tokio::test]
    async fn field_error_without_param_omits_key() {
        let err = ApiAuthError::InvalidCredentials;
        let json = body_json(err.into_response()).await;
        assert_eq!(json["errors"][0]["msg"], "Invalid credentials");
        assert!(json["errors"][0].get("param").is_none());
    }

    #[tokio::test]
    async fn activation_failure_payload() {
        let err = ApiAuthError::ActivationFailed(ActivationFailure::AlreadyActive);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Activation Failed");
        assert_eq!(json["error"], "Already Active User");
    }

    #[tokio::test]
    async fn reset_request_not_found_payload() {
        let err = ApiAuthError::ResetAccountNotFound;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Password Reset Request Failed");
        assert_eq!(json["error"], "User Not Found");
    }

    #[tokio::test]
    async fn guard_errors_are_distinguishable() {
        let missing = body_json(ApiAuthError::MissingAuthToken.into_response()).await;
        let invalid = body_json(ApiAuthError::InvalidAuthToken.into_response()).await;
        assert_eq!(
            missing["msg"],
            "No JSON Web Token found, authorization denied."
        );
        assert_eq!(invalid["msg"], "Token is not valid");
    }

    #[tokio::test]
    async fn reset_verify_failure_payload() {
        let response = ApiAuthError::InvalidResetToken.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Password Reset Failed");
        assert_eq!(json["error"], "Invalid Token");
    }

    #[tokio::test]
    async fn database_error_never_leaks_detail() {
        let err = ApiAuthError::Database(sqlx::Error::PoolClosed);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Server Error");
    }
}
