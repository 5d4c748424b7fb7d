//! # kut-core
//!
//! Shared types for keycloak-user-transfer:
//! - YAML configuration ([`config::Config`])
//! - configuration error type ([`error::ConfigError`])
//! - transfer outcome reporting ([`report::TransferReport`])
//! - the normalized source row model ([`record::SourceRow`])

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod record;
pub mod report;

pub use config::{Config, KeycloakConfig, MappingConfig, SourceConfig, TransferConfig};
pub use error::{ConfigError, ConfigResult};
pub use record::SourceRow;
pub use report::{RecordError, TransferReport};
