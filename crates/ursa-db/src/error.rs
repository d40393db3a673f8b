//! Error types for the ursa-db crate.
//!
//! Wraps `SQLx` errors with the failing phase (connect, migrate); query
//! errors propagate as plain `sqlx::Error` from the models.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),
}
