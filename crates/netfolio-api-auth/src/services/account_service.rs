//! Account lifecycle orchestration.
//!
//! One service owns every state transition: register, activate, login,
//! password reset request/verify. Handlers stay thin; this is where the
//! credential store, hasher, token service, and notifier meet.

use crate::error::{ActivationFailure, ApiAuthError};
use crate::models::RegisterRequest;
use crate::services::gravatar::gravatar_url;
use crate::services::notify::Notifier;
use crate::services::token_service::TokenService;
use netfolio_auth::PasswordHasher;
use netfolio_core::UserId;
use netfolio_db::{is_unique_violation, NewUser, User};
use sqlx::PgPool;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Constant-time match of a presented single-use token against the stored
/// value. A cleared (consumed) stored token never matches.
fn stored_token_matches(stored: Option<&str>, presented: &str) -> bool {
    match stored {
        Some(stored) => stored.as_bytes().ct_eq(presented.as_bytes()).into(),
        None => false,
    }
}

/// Orchestrates all account state transitions.
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    notifier: Notifier,
}

impl AccountService {
    #[must_use]
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, notifier: Notifier) -> Self {
        Self {
            pool,
            tokens,
            hasher: PasswordHasher::new(),
            notifier,
        }
    }

    /// Register a new account. Returns a session token.
    ///
    /// The account starts inactive; an activation email is dispatched
    /// fire-and-forget. The unique email index closes the window between the
    /// duplicate pre-check and the insert.
    ///
    /// # Errors
    ///
    /// `DuplicateAccount` if the email is taken; `Database` on storage
    /// faults.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiAuthError> {
        if User::find_by_email(&self.pool, &request.email)
            .await?
            .is_some()
        {
            return Err(ApiAuthError::DuplicateAccount);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let activation_token = self.tokens.issue_activation(&request.email)?;

        let new_user = NewUser {
            name: request.name.clone(),
            email: request.email.clone(),
            phone: Some(request.phone.clone()),
            password_hash,
            avatar_url: Some(gravatar_url(&request.email)),
            activation_token: activation_token.clone(),
        };

        let user = match User::insert(&self.pool, new_user).await {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(ApiAuthError::DuplicateAccount),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "Account registered");
        self.notifier
            .dispatch_activation(&user.email, &activation_token);

        Ok(self.tokens.issue_session(user.user_id())?)
    }

    /// Consume an activation token.
    ///
    /// Token signature, account resolution, and the stored-token match are
    /// all collapsed into `InvalidToken` so the endpoint cannot be used to
    /// probe which emails exist or which tokens are stale.
    ///
    /// # Errors
    ///
    /// `ActivationFailed` with the rejection reason; `Database` on storage
    /// faults.
    pub async fn activate(&self, activation_token: &str) -> Result<(), ApiAuthError> {
        let email = self
            .tokens
            .verify_activation(activation_token)
            .map_err(|_| ApiAuthError::ActivationFailed(ActivationFailure::InvalidToken))?;

        let user = User::find_by_email(&self.pool, &email)
            .await?
            .ok_or(ApiAuthError::ActivationFailed(ActivationFailure::InvalidToken))?;

        // A consumed token is cleared, so replay lands here, not on the
        // already-active branch.
        if !stored_token_matches(user.activation_token.as_deref(), activation_token) {
            return Err(ApiAuthError::ActivationFailed(
                ActivationFailure::InvalidToken,
            ));
        }

        if user.is_active {
            return Err(ApiAuthError::ActivationFailed(
                ActivationFailure::AlreadyActive,
            ));
        }

        let user = User::activate(&self.pool, user.id).await?;

        tracing::info!(user_id = %user.id, "Account activated");
        self.notifier
            .dispatch_welcome(&user.email, &user.name, user.phone.as_deref());

        Ok(())
    }

    /// Authenticate with email and password. Returns a session token.
    ///
    /// Account existence is never revealed: unknown email, federated-only
    /// account, and wrong password are the same error. The active check runs
    /// only after the password matched.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials`, `AccountNotActive`, or `Database`.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiAuthError> {
        let user = User::find_by_email(&self.pool, email)
            .await?
            .ok_or(ApiAuthError::InvalidCredentials)?;

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or(ApiAuthError::InvalidCredentials)?;

        let matches = self
            .hasher
            .verify(password, password_hash)
            .map_err(|_| ApiAuthError::InvalidCredentials)?;
        if !matches {
            return Err(ApiAuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(ApiAuthError::AccountNotActive);
        }

        Ok(self.tokens.issue_session(user.user_id())?)
    }

    /// Issue a password reset token and email the reset link.
    ///
    /// # Errors
    ///
    /// `ResetAccountNotFound` when no account has this email (this endpoint
    /// intentionally reveals existence); `Database` on storage faults.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiAuthError> {
        let user = User::find_by_email(&self.pool, email)
            .await?
            .ok_or(ApiAuthError::ResetAccountNotFound)?;

        let reset_token = self.tokens.issue_password_reset(&user.email)?;
        User::set_password_reset_token(&self.pool, user.id, &reset_token).await?;

        tracing::info!(user_id = %user.id, "Password reset requested");
        self.notifier
            .dispatch_password_reset(&user.email, &reset_token);

        Ok(())
    }

    /// Consume a password reset token and install a new password.
    ///
    /// # Errors
    ///
    /// `InvalidResetToken` on any token failure (signature, unknown email,
    /// stale token); `Database` on storage faults.
    pub async fn verify_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), ApiAuthError> {
        let email = self
            .tokens
            .verify_password_reset(reset_token)
            .map_err(|_| ApiAuthError::InvalidResetToken)?;

        let user = User::find_by_email(&self.pool, &email)
            .await?
            .ok_or(ApiAuthError::InvalidResetToken)?;

        if !stored_token_matches(user.password_reset_token.as_deref(), reset_token) {
            return Err(ApiAuthError::InvalidResetToken);
        }

        let password_hash = self.hasher.hash(new_password)?;
        User::update_password_and_clear_reset(&self.pool, user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Password updated via reset");
        self.notifier
            .dispatch_reset_confirmation(&user.email, &user.name);

        Ok(())
    }

    /// Fetch the account behind a verified session token.
    ///
    /// # Errors
    ///
    /// `InvalidAuthToken` when the token's user no longer exists; `Database`
    /// on storage faults.
    pub async fn current_user(&self, user_id: UserId) -> Result<User, ApiAuthError> {
        User::find_by_id(&self.pool, *user_id.as_uuid())
            .await?
            .ok_or(ApiAuthError::InvalidAuthToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_token_match_requires_exact_value() {
        assert!(stored_token_matches(Some("abc.def.ghi"), "abc.def.ghi"));
        assert!(!stored_token_matches(Some("abc.def.ghi"), "abc.def.ghX"));
        assert!(!stored_token_matches(Some("abc.def.ghi"), "abc.def"));
    }

    #[test]
    fn consumed_token_never_matches() {
        assert!(!stored_token_matches(None, "abc.def.ghi"));
        assert!(!stored_token_matches(None, ""));
    }
}
