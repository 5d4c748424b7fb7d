//! Source error types.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error raised by the PostgreSQL source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not connect to the database or the connection was lost.
    #[error("database connection error: {0}")]
    Connection(String),

    /// A query failed.
    #[error("database query error: {0}")]
    Query(String),

    /// A column value could not be decoded.
    #[error("cannot decode column '{column}': {message}")]
    Decode {
        /// Column name.
        column: String,
        /// Decode failure detail.
        message: String,
    },

    /// A table, query, or column identifier is not usable.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Unexpected internal error.
    #[error("internal source error: {0}")]
    Internal(String),
}

impl SourceError {
    /// Returns true when retrying the operation could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Converts a `SQLx` error into a source error.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> SourceError {
    match err {
        SqlxError::PoolTimedOut => SourceError::Connection("connection pool timeout".to_string()),
        SqlxError::PoolClosed => SourceError::Connection("connection pool closed".to_string()),
        SqlxError::Io(e) => SourceError::Connection(e.to_string()),
        SqlxError::Tls(e) => SourceError::Connection(e.to_string()),
        SqlxError::Database(db_err) => SourceError::Query(db_err.to_string()),
        SqlxError::ColumnDecode { index, source } => SourceError::Decode {
            column: index,
            message: source.to_string(),
        },
        _ => SourceError::Internal(err.to_string()),
    }
}

/// Result alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;
