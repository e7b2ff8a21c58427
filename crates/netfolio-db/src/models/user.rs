//! User account entity model.
//!
//! An account is created inactive by password registration and becomes
//! active once its activation token is consumed. Federated accounts are
//! created active with no password hash.

use chrono::{DateTime, Utc};
use netfolio_core::UserId;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A user account record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique identifier for this account.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Email address, unique case-insensitively.
    pub email: String,

    /// Phone number in international format, if provided at registration.
    pub phone: Option<String>,

    /// Argon2id hash of the password. `None` for federated accounts.
    pub password_hash: Option<String>,

    /// Avatar URL derived from the email or federated profile.
    pub avatar_url: Option<String>,

    /// Whether the account may log in.
    pub is_active: bool,

    /// Outstanding single-use activation token, cleared on activation.
    pub activation_token: Option<String>,

    /// Outstanding single-use password reset token, cleared on use.
    pub password_reset_token: Option<String>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for inserting a password-registered account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub activation_token: String,
}

impl User {
    /// Whether this account was created through federated login.
    #[must_use]
    pub fn is_federated(&self) -> bool {
        self.password_hash.is_none()
    }

    /// Get the account ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }

    /// Insert a new inactive account from password registration.
    ///
    /// The case-insensitive unique index on email serializes concurrent
    /// registrations; the loser gets a unique violation.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including unique violations.
    pub async fn insert(pool: &PgPool, new: NewUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, phone, password_hash, avatar_url, is_active, activation_token)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING *
            ",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .bind(&new.avatar_url)
        .bind(&new.activation_token)
        .fetch_one(pool)
        .await
    }

    /// Insert a new active account from a verified federated identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including unique violations.
    pub async fn insert_federated(
        pool: &PgPool,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, avatar_url, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .fetch_one(pool)
        .await
    }

    /// Find an account by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark the account active and clear its activation token.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn activate(pool: &PgPool, id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET is_active = TRUE, activation_token = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Store a freshly issued password reset token, replacing any prior one.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn set_password_reset_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET password_reset_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Replace the password hash and consume the outstanding reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_password_and_clear_reset(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2, password_reset_token = NULL, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(password_hash: Option<String>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            password_hash,
            avatar_url: None,
            is_active: true,
            activation_token: None,
            password_reset_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_federated_has_no_password() {
        let user = sample_user(None);
        assert!(user.is_federated());
    }

    #[test]
    fn test_password_account_is_not_federated() {
        let user = sample_user(Some("$argon2id$...".to_string()));
        assert!(!user.is_federated());
    }

    #[test]
    fn test_user_id_round_trips() {
        let user = sample_user(None);
        assert_eq!(*user.user_id().as_uuid(), user.id);
    }
}
