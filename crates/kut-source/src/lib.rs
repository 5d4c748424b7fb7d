//! # kut-source
//!
//! PostgreSQL source for keycloak-user-transfer.
//!
//! Reads user rows in stable batches from a table or custom query and
//! normalizes them into [`kut_core::SourceRow`] values for mapping.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod pool;
pub mod source;

pub use error::{SourceError, SourceResult};
pub use pool::{create_pool, PoolConfig};
pub use source::PgUserSource;
