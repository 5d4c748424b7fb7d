//! The `run` command: execute the transfer.

use std::path::Path;

use kut_keycloak::AdminClient;
use kut_source::{create_pool, PgUserSource, PoolConfig};
use kut_transfer::TransferEngine;

use crate::cli::{OutputFormat, RunArgs};
use crate::error::CliResult;
use crate::output::{self, info};

use super::load_config;

/// Runs the transfer.
///
/// Returns the process exit code: 0 on a clean run, 2 when the run
/// completed but some records failed.
pub async fn run_transfer(
    args: RunArgs,
    config_path: &Path,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut config = load_config(config_path)?;
    if let Some(batch_size) = args.batch_size {
        config.source.batch_size = batch_size;
        config.validate()?;
    }

    // Fail fast on credentials before touching the source.
    let client = AdminClient::new(&config.keycloak)?;
    client.check_auth().await?;

    let pool = create_pool(&PoolConfig::from(&config.source)).await?;
    let columns: Vec<String> = config
        .mapping
        .referenced_columns()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let source = PgUserSource::new(pool, &config.source, columns)?;
    source.test_connection().await?;

    if args.dry_run || config.transfer.dry_run {
        info("Dry run: no users will be written");
    }

    let report = TransferEngine::new(&source, &client, &config)
        .dry_run(args.dry_run)
        .update_existing(args.update_existing)
        .run()
        .await?;

    output::report(&report, format)?;

    Ok(if report.has_failures() { 2 } else { 0 })
}
