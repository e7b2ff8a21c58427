//! Federated login orchestration.

use crate::error::SocialError;
use crate::verifier::{GoogleIdTokenVerifier, GOOGLE_JWKS_URI};
use netfolio_api_auth::services::TokenService;
use netfolio_db::{is_unique_violation, User};
use sqlx::PgPool;
use std::sync::Arc;

/// Maps verified Google identities to local accounts and session tokens.
#[derive(Clone)]
pub struct GoogleAuthService {
    pool: PgPool,
    verifier: GoogleIdTokenVerifier,
    tokens: Arc<TokenService>,
    client_id: String,
}

impl GoogleAuthService {
    #[must_use]
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, client_id: impl Into<String>) -> Self {
        Self {
            pool,
            verifier: GoogleIdTokenVerifier::new(),
            tokens,
            client_id: client_id.into(),
        }
    }

    /// Verify a Google ID token and return a session token for the local
    /// account, creating the account on first login.
    ///
    /// Federated accounts are implicitly active and carry no password; the
    /// avatar comes from the Google `picture` claim.
    ///
    /// # Errors
    ///
    /// `VerificationFailed` (401) when the token is not a valid Google ID
    /// token for the configured client; `JwksFetchFailed` or `Database` on
    /// infrastructure faults.
    pub async fn login(&self, id_token: &str) -> Result<String, SocialError> {
        let claims = self
            .verifier
            .verify(id_token, GOOGLE_JWKS_URI, &self.client_id)
            .await?;

        let email = claims.email.ok_or_else(|| SocialError::VerificationFailed {
            reason: "ID token carries no email claim".to_string(),
        })?;
        // Display name falls back to the email's local part.
        let name = claims
            .name
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        let user = match User::find_by_email(&self.pool, &email).await? {
            Some(user) => user,
            None => {
                match User::insert_federated(&self.pool, &name, &email, claims.picture.as_deref())
                    .await
                {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, "Federated account created");
                        user
                    }
                    // Two first logins raced; the other one won the insert.
                    Err(e) if is_unique_violation(&e) => {
                        User::find_by_email(&self.pool, &email).await?.ok_or(e)?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        Ok(self.tokens.issue_session(user.user_id())?)
    }
}
