//! Common error types for IDR

use thiserror::Error;

/// Common result type for IDR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the IDR crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient storage contention; the operation was retried and the
    /// retry budget ran out
    #[error("Storage busy: {0}")]
    Busy(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for transient SQLite lock or stale-snapshot conflicts that a
    /// fresh transaction can be expected to clear.
    ///
    /// SQLite reports both plain write-lock contention and WAL snapshot
    /// conflicts as "database is locked"; anything else is not retryable.
    pub fn is_transient_lock(&self) -> bool {
        match self {
            Error::Database(err) => {
                let msg = err.to_string();
                msg.contains("database is locked") || msg.contains("database table is locked")
            }
            _ => false,
        }
    }
}
