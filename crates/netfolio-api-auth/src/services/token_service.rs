//! Token issuance and verification policy.
//!
//! Wraps `netfolio-auth` with the lifetimes and claim shapes used by the
//! lifecycle endpoints. Session tokens carry a user ID; activation and
//! password reset tokens carry the account email.

use netfolio_auth::{decode_token, encode_token, AuthError, Claims, TokenPurpose};
use netfolio_core::UserId;

/// Session token validity, password and federated login alike.
pub const SESSION_TOKEN_VALIDITY_HOURS: i64 = 2;

/// Activation token validity.
pub const ACTIVATION_TOKEN_VALIDITY_HOURS: i64 = 24;

/// Password reset token validity.
pub const PASSWORD_RESET_TOKEN_VALIDITY_HOURS: i64 = 1;

/// Issues and verifies the three token kinds.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the signing secret.
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
        }
    }

    /// Issue a 2-hour session token for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue_session(&self, user_id: UserId) -> Result<String, AuthError> {
        let claims = Claims::builder()
            .subject(user_id.to_string())
            .issuer(&self.issuer)
            .purpose(TokenPurpose::Session)
            .expires_in_secs(SESSION_TOKEN_VALIDITY_HOURS * 3600)
            .build();
        encode_token(&claims, &self.secret)
    }

    /// Issue a 24-hour activation token bound to an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue_activation(&self, email: &str) -> Result<String, AuthError> {
        let claims = Claims::builder()
            .subject(email)
            .issuer(&self.issuer)
            .purpose(TokenPurpose::Activation)
            .expires_in_secs(ACTIVATION_TOKEN_VALIDITY_HOURS * 3600)
            .build();
        encode_token(&claims, &self.secret)
    }

    /// Issue a 1-hour password reset token bound to an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue_password_reset(&self, email: &str) -> Result<String, AuthError> {
        let claims = Claims::builder()
            .subject(email)
            .issuer(&self.issuer)
            .purpose(TokenPurpose::PasswordReset)
            .expires_in_secs(PASSWORD_RESET_TOKEN_VALIDITY_HOURS * 3600)
            .build();
        encode_token(&claims, &self.secret)
    }

    /// Verify a session token and return the user ID it is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, not a session
    /// token, or its subject is not a user ID.
    pub fn verify_session(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = decode_token(token, &self.secret, TokenPurpose::Session)?;
        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken("Session subject is not a user ID".to_string()))
    }

    /// Verify an activation token and return the email it is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, or not an
    /// activation token.
    pub fn verify_activation(&self, token: &str) -> Result<String, AuthError> {
        let claims = decode_token(token, &self.secret, TokenPurpose::Activation)?;
        Ok(claims.sub)
    }

    /// Verify a password reset token and return the email it is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, or not a reset
    /// token.
    pub fn verify_password_reset(&self, token: &str) -> Result<String, AuthError> {
        let claims = decode_token(token, &self.secret, TokenPurpose::PasswordReset)?;
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret".to_vec(), "netfolio")
    }

    #[test]
    fn session_round_trip() {
        let svc = service();
        let user_id = UserId::new();
        let token = svc.issue_session(user_id).unwrap();
        assert_eq!(svc.verify_session(&token).unwrap(), user_id);
    }

    #[test]
    fn activation_round_trip() {
        let svc = service();
        let token = svc.issue_activation("a@x.com").unwrap();
        assert_eq!(svc.verify_activation(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn reset_round_trip() {
        let svc = service();
        let token = svc.issue_password_reset("a@x.com").unwrap();
        assert_eq!(svc.verify_password_reset(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn purposes_are_not_interchangeable() {
        let svc = service();
        let activation = svc.issue_activation("a@x.com").unwrap();
        let reset = svc.issue_password_reset("a@x.com").unwrap();
        let session = svc.issue_session(UserId::new()).unwrap();

        assert!(svc.verify_session(&activation).is_err());
        assert!(svc.verify_activation(&reset).is_err());
        assert!(svc.verify_password_reset(&session).is_err());
        assert!(svc.verify_password_reset(&activation).is_err());
    }

    #[test]
    fn other_secret_rejected() {
        let token = service().issue_session(UserId::new()).unwrap();
        let other = TokenService::new(b"other-secret".to_vec(), "netfolio");
        assert!(other.verify_session(&token).is_err());
    }

    #[test]
    fn session_with_email_subject_rejected() {
        // Forge a session-purpose token whose subject is an email, as a
        // cross-purpose refactoring would produce.
        let svc = service();
        let claims = Claims::builder()
            .subject("a@x.com")
            .issuer("netfolio")
            .purpose(TokenPurpose::Session)
            .expires_in_secs(60)
            .build();
        let token = netfolio_auth::encode_token(&claims, b"test-secret").unwrap();
        assert!(svc.verify_session(&token).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let repr = format!("{:?}", service());
        assert!(!repr.contains("test-secret"));
    }
}
