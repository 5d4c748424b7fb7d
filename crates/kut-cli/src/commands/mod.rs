//! Command implementations.

use std::path::Path;

use kut_core::Config;

use crate::error::CliResult;
use crate::output::prompt_password;

pub mod check;
pub mod run;
pub mod sample;
pub mod validate;

pub use check::run_check;
pub use run::run_transfer;
pub use sample::run_sample_config;
pub use validate::run_validate;

/// Loads the configuration, prompting for the admin password when a
/// username is configured without one.
pub fn load_config(path: &Path) -> CliResult<Config> {
    let mut config = Config::from_yaml_file(path)?;

    if config.keycloak.username.is_some() && config.keycloak.password.is_none() {
        let password = prompt_password("Keycloak admin password: ")?;
        config.keycloak.password = Some(password);
    }

    Ok(config)
}
