//! Request and response DTOs for the account lifecycle endpoints.

use chrono::{DateTime, Utc};
use netfolio_db::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Registration request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address.
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    /// Mobile phone number in international format.
    #[validate(custom = "validate_phone")]
    pub phone: String,

    /// Password.
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
}

/// Login request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password reset request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResetRequestBody {
    /// Email address of the account to reset.
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
}

/// New password supplied on password reset verification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResetVerifyBody {
    /// Replacement password.
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
}

/// `{"token": ...}` success payload for register, login, and federated login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed session token.
    pub token: String,
}

/// `{"msg": ...}` success payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// The account as returned by `GET /api/auth`. Never carries the password
/// hash or outstanding token values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            avatar_url: user.avatar_url,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Validate a mobile phone number: optional leading `+`, then 7 to 15 digits.
///
/// Mirrors the loose "is this a mobile number" check applied at registration;
/// real deliverability is the SMS provider's problem.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let ok = (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Please include a valid phone number".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register() -> RegisterRequest {
        RegisterRequest {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+15551234567".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(valid_register().validate().is_ok());
    }

    #[test]
    fn empty_name_fails() {
        let mut req = valid_register();
        req.name = String::new();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn malformed_email_fails() {
        let mut req = valid_register();
        req.email = "not-an-email".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn short_password_fails() {
        let mut req = valid_register();
        req.password = "five5".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn six_char_password_passes() {
        let mut req = valid_register();
        req.password = "sixsix".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn phone_accepts_international_format() {
        assert!(validate_phone("+15551234567").is_ok());
        assert!(validate_phone("15551234567").is_ok());
        assert!(validate_phone("+4915112345678").is_ok());
    }

    #[test]
    fn phone_rejects_garbage() {
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err()); // too short
        assert!(validate_phone("+1234567890123456").is_err()); // too long
        assert!(validate_phone("555-123-4567").is_err()); // separators
        assert!(validate_phone("phone").is_err());
    }

    #[test]
    fn multiple_violations_report_every_field() {
        let req = RegisterRequest {
            name: String::new(),
            email: "bad".to_string(),
            phone: "nope".to_string(),
            password: "abc".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);
    }

    #[test]
    fn account_response_drops_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            password_hash: Some("$argon2id$secret".to_string()),
            avatar_url: Some("https://example.com/a.png".to_string()),
            is_active: true,
            activation_token: None,
            password_reset_token: Some("stale".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(AccountResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_reset_token").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
