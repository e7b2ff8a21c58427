//! PostgreSQL persistence layer for the netfolio identity service.
//!
//! Owns the connection pool, embedded migrations, and the account model.
//! Query methods live on the model types and take a pool reference, so the
//! API crates never write SQL themselves.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::user::{NewUser, User};
pub use pool::DbPool;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Check whether a query error is a unique constraint violation.
///
/// Concurrent registrations with the same email address both reach the
/// insert; the loser surfaces here and is mapped to a duplicate-account
/// response by the caller.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code == UNIQUE_VIOLATION_CODE),
        _ => false,
    }
}
