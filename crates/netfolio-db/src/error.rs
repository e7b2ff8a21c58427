//! Error types for the netfolio-db crate.
//!
//! Query-level failures surface as `sqlx::Error` from the model methods;
//! this type covers the pool and migration entry points only.

use thiserror::Error;

/// Database setup errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_display() {
        let err = DbError::ConnectionFailed(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Database connection failed"));
    }
}
