//! # kut-transfer
//!
//! The heart of keycloak-user-transfer: maps source rows to Keycloak
//! user representations and runs the idempotent transfer loop.
//!
//! The engine talks to the database and the server through the
//! [`engine::RowSource`] and [`engine::UserSink`] traits, so it can be
//! exercised without either.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod engine;
pub mod error;
pub mod mapper;
mod providers;

pub use engine::{RowSource, TransferEngine, UserSink};
pub use error::{TransferError, TransferResult};
pub use mapper::{MappedUser, RowMapper};
