//! API error types.

use thiserror::Error;

/// Error raised by the Keycloak admin API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed in the HTTP layer (middleware, connection, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    /// Request failed in reqwest itself (body decoding, builder).
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, when available.
        message: String,
    },

    /// The resource already exists (HTTP 409).
    #[error("already exists: {0}")]
    Conflict(String),

    /// Token acquisition failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// A response body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Returns true when retrying the operation could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Http(e) => match e {
                reqwest_middleware::Error::Reqwest(r) => r.is_timeout() || r.is_connect(),
                reqwest_middleware::Error::Middleware(_) => false,
            },
            Self::Request(r) => r.is_timeout() || r.is_connect(),
            _ => false,
        }
    }
}

/// Result alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
