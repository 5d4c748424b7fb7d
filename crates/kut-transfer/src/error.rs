//! Transfer error types.

use thiserror::Error;

/// Error that aborts a transfer run.
///
/// Per-record problems are not errors at this level; they are recorded
/// in the [`kut_core::TransferReport`] and the run continues.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The source database failed.
    #[error(transparent)]
    Source(#[from] kut_source::SourceError),

    /// The Keycloak API failed in a way that affects the whole run
    /// (e.g., authentication).
    #[error(transparent)]
    Api(#[from] kut_keycloak::ApiError),

    /// A row could not be mapped to a user.
    #[error("mapping error: {0}")]
    Mapping(String),
}

impl TransferError {
    /// Creates a mapping error.
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }
}

/// Result alias for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;
