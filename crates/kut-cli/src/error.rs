//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error.
    #[error("configuration error: {0}")]
    Config(#[from] kut_core::ConfigError),

    /// Database error.
    #[error(transparent)]
    Source(#[from] kut_source::SourceError),

    /// Keycloak API error.
    #[error(transparent)]
    Api(#[from] kut_keycloak::ApiError),

    /// Transfer run error.
    #[error(transparent)]
    Transfer(#[from] kut_transfer::TransferError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
