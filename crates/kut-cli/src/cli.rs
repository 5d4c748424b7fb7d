//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Transfer users from PostgreSQL to Keycloak via the admin REST API.
#[derive(Debug, Parser)]
#[command(name = "keycloak-user-transfer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(
        short,
        long,
        env = "KUT_CONFIG",
        default_value = "keycloak-user-transfer.yml",
        global = true
    )]
    pub config: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the transfer.
    Run(RunArgs),

    /// Test the database connection and Keycloak authentication.
    Check,

    /// Validate the configuration file and show the effective mapping.
    Validate,

    /// Print a commented sample configuration file.
    SampleConfig,
}

/// Arguments for `run`.
#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Perform lookups but write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Update users that already exist instead of skipping them.
    #[arg(long)]
    pub update_existing: bool,

    /// Override the configured batch size.
    #[arg(long)]
    pub batch_size: Option<u32>,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,
    /// JSON report.
    Json,
    /// Minimal output (status line only).
    Quiet,
}
