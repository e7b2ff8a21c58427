//! Google ID token verification against Google's JWKS.
//!
//! Fetches Google's signing keys, verifies the token signature, and
//! validates issuer, audience, and expiry. The signing algorithm is taken
//! from the JWK, never from the token header, so an attacker-controlled
//! header cannot downgrade verification.

use crate::error::SocialError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::sync::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

/// Google's JWKS endpoint.
pub const GOOGLE_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuer values Google uses, with and without scheme.
const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];

/// Maximum JWKS response size to prevent OOM from malicious responses.
const MAX_JWKS_SIZE: usize = 512 * 1024;

/// JWKS cache TTL.
const JWKS_CACHE_TTL_SECS: u64 = 600;

/// HTTP client timeout for JWKS fetches.
const JWKS_FETCH_TIMEOUT_SECS: u64 = 10;

/// Clock skew leeway for expiry validation.
const LEEWAY_SECS: u64 = 60;

/// Hosts JWKS may be fetched from (SSRF protection).
const ALLOWED_JWKS_HOSTS: &[&str] = &["www.googleapis.com"];

/// Claims extracted from a verified Google ID token.
#[derive(Debug, Deserialize)]
pub struct GoogleIdTokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: StringOrArray,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrArray {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrArray {
    /// Check if the audience contains a specific value.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match self {
            StringOrArray::Single(s) => s == value,
            StringOrArray::Multiple(v) => v.iter().any(|s| s == value),
        }
    }
}

/// JWKS response structure (RFC 7517).
#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// Individual JWK. Google signs with RSA only.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    alg: Option<String>,
    /// RSA modulus (base64url encoded).
    n: Option<String>,
    /// RSA exponent (base64url encoded).
    e: Option<String>,
}

/// Process-global JWKS cache shared across requests.
fn jwks_cache() -> &'static Cache<String, JwkSet> {
    static CACHE: OnceLock<Cache<String, JwkSet>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(2)
            .time_to_live(Duration::from_secs(JWKS_CACHE_TTL_SECS))
            .build()
    })
}

/// Verifies Google ID tokens. Constructed once and shared.
#[derive(Clone)]
pub struct GoogleIdTokenVerifier {
    http_client: Client,
}

impl Default for GoogleIdTokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleIdTokenVerifier {
    /// Create a verifier with a dedicated HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(JWKS_FETCH_TIMEOUT_SECS))
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Verify an ID token's signature, issuer, audience, and expiry.
    ///
    /// # Errors
    ///
    /// `JwksFetchFailed` when Google's keys cannot be fetched;
    /// `VerificationFailed` for every signature or claim failure.
    pub async fn verify(
        &self,
        token: &str,
        jwks_uri: &str,
        expected_audience: &str,
    ) -> Result<GoogleIdTokenClaims, SocialError> {
        validate_jwks_uri(jwks_uri)?;

        let header = decode_header(token).map_err(|e| SocialError::VerificationFailed {
            reason: format!("Failed to decode ID token header: {e}"),
        })?;

        let kid = header.kid.ok_or_else(|| SocialError::VerificationFailed {
            reason: "ID token missing kid in header".to_string(),
        })?;

        let jwk = self.resolve_key(jwks_uri, &kid).await?;
        let (decoding_key, algorithm) = build_decoding_key(&jwk)?;

        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[expected_audience]);
        validation.set_issuer(GOOGLE_ISSUERS);
        validation.leeway = LEEWAY_SECS;

        let token_data =
            decode::<GoogleIdTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
                SocialError::VerificationFailed {
                    reason: format!("Signature or claims validation failed: {e}"),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Find the JWK for a kid, refreshing the cache once on a miss so key
    /// rotation does not strand valid tokens for the cache TTL.
    async fn resolve_key(&self, jwks_uri: &str, kid: &str) -> Result<Jwk, SocialError> {
        let jwks = self.get_jwks(jwks_uri).await?;
        if let Some(key) = jwks.keys.iter().find(|k| k.kid.as_deref() == Some(kid)) {
            return Ok(key.clone());
        }

        tracing::info!(kid = %kid, "Unknown kid in cached JWKS, refreshing");
        jwks_cache().invalidate(jwks_uri);

        let refreshed = self.fetch_jwks(jwks_uri).await?;
        let key = refreshed
            .keys
            .iter()
            .find(|k| k.kid.as_deref() == Some(kid))
            .cloned()
            .ok_or_else(|| SocialError::VerificationFailed {
                reason: format!("No matching public key for kid '{kid}' after JWKS refresh"),
            })?;
        jwks_cache().insert(jwks_uri.to_string(), refreshed);

        Ok(key)
    }

    async fn get_jwks(&self, jwks_uri: &str) -> Result<JwkSet, SocialError> {
        if let Some(cached) = jwks_cache().get(jwks_uri) {
            return Ok(cached);
        }
        let fetched = self.fetch_jwks(jwks_uri).await?;
        jwks_cache().insert(jwks_uri.to_string(), fetched.clone());
        Ok(fetched)
    }

    async fn fetch_jwks(&self, jwks_uri: &str) -> Result<JwkSet, SocialError> {
        let response = self.http_client.get(jwks_uri).send().await.map_err(|e| {
            SocialError::JwksFetchFailed {
                reason: format!("HTTP request failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            return Err(SocialError::JwksFetchFailed {
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SocialError::JwksFetchFailed {
                reason: format!("Failed to read response: {e}"),
            })?;

        if bytes.len() > MAX_JWKS_SIZE {
            return Err(SocialError::JwksFetchFailed {
                reason: format!("Response too large: {} bytes", bytes.len()),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| SocialError::JwksFetchFailed {
            reason: format!("Failed to parse JWKS: {e}"),
        })
    }
}

/// Reject JWKS URIs outside the Google allowlist (SSRF protection).
fn validate_jwks_uri(jwks_uri: &str) -> Result<(), SocialError> {
    let url = Url::parse(jwks_uri).map_err(|_| SocialError::VerificationFailed {
        reason: "Invalid JWKS URI".to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(SocialError::VerificationFailed {
            reason: "JWKS URI must use HTTPS".to_string(),
        });
    }

    let host = url.host_str().unwrap_or("");
    if !ALLOWED_JWKS_HOSTS.contains(&host) {
        return Err(SocialError::VerificationFailed {
            reason: format!("JWKS host '{host}' not in allowlist"),
        });
    }

    Ok(())
}

/// Build a decoding key from a JWK, taking the algorithm from the JWK's
/// `alg` field rather than the token header.
fn build_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), SocialError> {
    if jwk.kty != "RSA" {
        return Err(SocialError::VerificationFailed {
            reason: format!("Unsupported JWK key type: {}", jwk.kty),
        });
    }

    let n = jwk.n.as_ref().ok_or_else(|| SocialError::VerificationFailed {
        reason: "RSA JWK missing 'n' field".to_string(),
    })?;
    let e = jwk.e.as_ref().ok_or_else(|| SocialError::VerificationFailed {
        reason: "RSA JWK missing 'e' field".to_string(),
    })?;

    let key =
        DecodingKey::from_rsa_components(n, e).map_err(|e| SocialError::VerificationFailed {
            reason: format!("Failed to build RSA decoding key: {e}"),
        })?;
    let alg = match jwk.alg.as_deref() {
        Some("RS384") => Algorithm::RS384,
        Some("RS512") => Algorithm::RS512,
        // Google signs with RS256
        _ => Algorithm::RS256,
    };

    Ok((key, alg))
}
