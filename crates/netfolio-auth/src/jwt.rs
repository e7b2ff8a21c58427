//! JWT encoding and decoding with the HS256 algorithm.
//!
//! The service both issues and verifies its own tokens, so a single shared
//! secret is sufficient; there is no cross-service key distribution.

use crate::claims::{Claims, TokenPurpose};
use crate::error::AuthError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Clock skew tolerance for exp validation, in seconds.
const LEEWAY_SECS: u64 = 60;

/// Encode claims into a signed HS256 token string.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if serialization fails (which indicates
/// a bug rather than a runtime condition).
pub fn encode_token(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret);
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &key)
        .map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {e}")))
}

/// Decode and validate a token, requiring a specific purpose.
///
/// Signature, expiry (with leeway), and the `purpose` claim are all checked.
/// A valid token with the wrong purpose fails with `AuthError::WrongPurpose`
/// so an activation token can never be used as a session token or vice versa.
///
/// # Errors
///
/// - `AuthError::TokenExpired` — exp is in the past
/// - `AuthError::InvalidSignature` — signature verification failed
/// - `AuthError::InvalidToken` — malformed token
/// - `AuthError::WrongPurpose` — purpose mismatch
pub fn decode_token(
    token: &str,
    secret: &[u8],
    expected_purpose: TokenPurpose,
) -> Result<Claims, AuthError> {
    let claims = decode_token_any_purpose(token, secret)?;

    if claims.purpose != expected_purpose {
        return Err(AuthError::WrongPurpose {
            expected: expected_purpose,
            actual: claims.purpose,
        });
    }

    Ok(claims)
}

/// Decode and validate a token without enforcing a purpose.
///
/// Exposed for diagnostics; production call sites should prefer
/// [`decode_token`] with an explicit purpose.
pub fn decode_token_any_purpose(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = LEEWAY_SECS;
    validation.validate_aud = false;
    // Only accept HS256
    validation.algorithms = vec![Algorithm::HS256];

    let token_data = decode::<Claims>(token, &key, &validation).map_err(map_jwt_error)?;

    Ok(token_data.claims)
}

/// Map jsonwebtoken errors to `AuthError`.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidAlgorithm,
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &[u8] = b"test-signing-secret";
    const WRONG_SECRET: &[u8] = b"a-different-secret";

    fn session_claims(sub: &str) -> Claims {
        Claims::builder()
            .subject(sub)
            .issuer("netfolio")
            .purpose(TokenPurpose::Session)
            .expires_in_secs(7200)
            .build()
    }

    #[test]
    fn encode_produces_three_part_token() {
        let token = encode_token(&session_claims("user-1"), SECRET).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn round_trip_preserves_claims() {
        let claims = session_claims("user-1");
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET, TokenPurpose::Session).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.iss, claims.iss);
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.purpose, TokenPurpose::Session);
    }

    #[test]
    fn wrong_secret_fails_with_invalid_signature() {
        let token = encode_token(&session_claims("user-1"), SECRET).unwrap();
        let err = decode_token(&token, WRONG_SECRET, TokenPurpose::Session).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        // 120 seconds past expiry exceeds the 60 second leeway
        let claims = Claims::builder()
            .subject("user-1")
            .purpose(TokenPurpose::Session)
            .expiration(Utc::now().timestamp() - 120)
            .build();
        let token = encode_token(&claims, SECRET).unwrap();

        let err = decode_token(&token, SECRET, TokenPurpose::Session).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn leeway_tolerates_recent_expiry() {
        let claims = Claims::builder()
            .subject("user-1")
            .purpose(TokenPurpose::Session)
            .expiration(Utc::now().timestamp() - 30)
            .build();
        let token = encode_token(&claims, SECRET).unwrap();

        assert!(decode_token(&token, SECRET, TokenPurpose::Session).is_ok());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let err = decode_token("not.a.valid.token", SECRET, TokenPurpose::Session).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn purpose_mismatch_is_rejected() {
        let claims = Claims::builder()
            .subject("a@x.com")
            .purpose(TokenPurpose::Activation)
            .expires_in_secs(3600)
            .build();
        let token = encode_token(&claims, SECRET).unwrap();

        let err = decode_token(&token, SECRET, TokenPurpose::Session).unwrap_err();
        assert!(matches!(
            err,
            AuthError::WrongPurpose {
                expected: TokenPurpose::Session,
                actual: TokenPurpose::Activation,
            }
        ));

        // The same token presented with the right purpose succeeds.
        assert!(decode_token(&token, SECRET, TokenPurpose::Activation).is_ok());
    }

    #[test]
    fn any_purpose_decode_skips_purpose_check() {
        let claims = Claims::builder()
            .subject("a@x.com")
            .purpose(TokenPurpose::PasswordReset)
            .expires_in_secs(3600)
            .build();
        let token = encode_token(&claims, SECRET).unwrap();

        let decoded = decode_token_any_purpose(&token, SECRET).unwrap();
        assert_eq!(decoded.purpose, TokenPurpose::PasswordReset);
    }
}
