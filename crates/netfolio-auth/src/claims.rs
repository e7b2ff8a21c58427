//! JWT claim set with a mandatory purpose discriminator.
//!
//! One signing mechanism serves three token kinds (session, activation,
//! password reset). The `purpose` claim keeps them apart: verification always
//! names the purpose it expects, so an activation token presented as a session
//! token is rejected before any account lookup happens.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Proof of a recent successful authentication. Subject is a user ID.
    Session,
    /// Single-use account activation capability. Subject is an email address.
    Activation,
    /// Single-use password reset capability. Subject is an email address.
    PasswordReset,
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPurpose::Session => write!(f, "session"),
            TokenPurpose::Activation => write!(f, "activation"),
            TokenPurpose::PasswordReset => write!(f, "password_reset"),
        }
    }
}

/// JWT claims carried by every netfolio token.
///
/// # Standard claims (RFC 7519)
///
/// - `sub`: subject — user ID for session tokens, email for the others
/// - `iss`: issuer
/// - `exp` / `iat`: expiry and issue time (Unix timestamps)
/// - `jti`: unique token identifier
///
/// # Custom claims
///
/// - `purpose`: the [`TokenPurpose`] discriminator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject.
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    pub iat: i64,

    /// JWT ID, unique per issued token.
    pub jti: String,

    /// Token purpose discriminator.
    pub purpose: TokenPurpose,
}

impl Claims {
    /// Start building a claim set.
    #[must_use]
    pub fn builder() -> ClaimsBuilder {
        ClaimsBuilder::default()
    }

    /// Whether the token is expired relative to the current clock.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Builder for [`Claims`].
#[derive(Debug, Default)]
pub struct ClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    exp: Option<i64>,
    purpose: Option<TokenPurpose>,
}

impl ClaimsBuilder {
    /// Set the subject.
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the token purpose.
    #[must_use]
    pub fn purpose(mut self, purpose: TokenPurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Set an absolute expiration timestamp.
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set expiration relative to now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(secs)).timestamp());
        self
    }

    /// Build the claim set.
    ///
    /// Unset fields fall back to: empty subject, empty issuer, a one-hour
    /// expiry, and [`TokenPurpose::Session`]. Callers are expected to set all
    /// of them; the defaults only keep the builder infallible.
    #[must_use]
    pub fn build(self) -> Claims {
        let now = Utc::now();
        Claims {
            sub: self.sub.unwrap_or_default(),
            iss: self.iss.unwrap_or_default(),
            exp: self
                .exp
                .unwrap_or_else(|| (now + Duration::hours(1)).timestamp()),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            purpose: self.purpose.unwrap_or(TokenPurpose::Session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_all_fields() {
        let claims = Claims::builder()
            .subject("user-123")
            .issuer("netfolio")
            .purpose(TokenPurpose::Activation)
            .expires_in_secs(3600)
            .build();

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.iss, "netfolio");
        assert_eq!(claims.purpose, TokenPurpose::Activation);
        assert!(!claims.is_expired());
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn jti_is_unique_per_build() {
        let a = Claims::builder().subject("x").build();
        let b = Claims::builder().subject("x").build();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn past_expiration_is_expired() {
        let claims = Claims::builder()
            .subject("user-123")
            .expiration(Utc::now().timestamp() - 60)
            .build();
        assert!(claims.is_expired());
    }

    #[test]
    fn purpose_serializes_snake_case() {
        let json = serde_json::to_string(&TokenPurpose::PasswordReset).unwrap();
        assert_eq!(json, "\"password_reset\"");
        let json = serde_json::to_string(&TokenPurpose::Session).unwrap();
        assert_eq!(json, "\"session\"");
    }

    #[test]
    fn claims_round_trip_through_json() {
        let claims = Claims::builder()
            .subject("a@x.com")
            .issuer("netfolio")
            .purpose(TokenPurpose::PasswordReset)
            .expires_in_secs(600)
            .build();

        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
    }
}
