//! # kut-keycloak
//!
//! Minimal Keycloak admin REST API client for keycloak-user-transfer.
//!
//! Covers exactly the surface a user transfer needs: admin token
//! acquisition, user lookup by username, user create/update, and
//! password resets. Transient HTTP failures are retried with
//! exponential backoff.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod auth;
pub mod client;
pub mod error;
pub mod rep;

pub use auth::{AdminToken, TokenClient};
pub use client::{AdminClient, CreateOutcome};
pub use error::{ApiError, ApiResult};
pub use rep::{CredentialRepresentation, UserRepresentation};
