//! # kut-cli
//!
//! The `keycloak-user-transfer` command-line tool:
//! - `run`: transfer users from PostgreSQL into a Keycloak realm
//! - `check`: test the database connection and Keycloak authentication
//! - `validate`: parse and validate the configuration file
//! - `sample-config`: print a commented sample configuration

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};
