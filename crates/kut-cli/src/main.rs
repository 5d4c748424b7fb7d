//! # keycloak-user-transfer
//!
//! Transfers users from PostgreSQL to Keycloak via the admin REST API.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kut_cli::{
    cli::{Cli, Command},
    commands::{run_check, run_sample_config, run_transfer, run_validate},
    output::error,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run_transfer(args, &cli.config, cli.output).await,
        Command::Check => run_check(&cli.config).await,
        Command::Validate => run_validate(&cli.config, cli.output),
        Command::SampleConfig => run_sample_config(),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            error(&e.to_string());
            1
        }
    };

    std::process::exit(code);
}

/// Initializes tracing from RUST_LOG, with `--verbose` as a floor.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
