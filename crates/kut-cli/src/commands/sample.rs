//! The `sample-config` command.

use kut_core::Config;

use crate::error::CliResult;

/// Prints a commented sample configuration to stdout.
pub fn run_sample_config() -> CliResult<i32> {
    print!("{}", Config::sample());
    Ok(0)
}
