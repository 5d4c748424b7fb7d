//! Output formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use kut_core::TransferReport;

use crate::cli::OutputFormat;
use crate::error::CliResult;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Summary table row.
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Users")]
    count: usize,
}

/// Failure table row.
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Source Key")]
    source_key: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Error")]
    message: String,
}

/// Renders the final transfer report.
pub fn report(report: &TransferReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            let rows = vec![
                SummaryRow {
                    outcome: "added",
                    count: report.added,
                },
                SummaryRow {
                    outcome: "updated",
                    count: report.updated,
                },
                SummaryRow {
                    outcome: "skipped",
                    count: report.skipped,
                },
                SummaryRow {
                    outcome: "failed",
                    count: report.failed,
                },
            ];
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");

            if !report.errors.is_empty() {
                let failures: Vec<FailureRow> = report
                    .errors
                    .iter()
                    .map(|e| FailureRow {
                        source_key: e.source_key.clone(),
                        username: e.username.clone().unwrap_or_default(),
                        message: e.message.clone(),
                    })
                    .collect();
                let table = Table::new(failures).with(Style::rounded()).to_string();
                println!("{table}");
            }

            if report.has_failures() {
                warning(&report.status);
            } else {
                success(&report.status);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {
            println!("{}", report.status);
        }
    }
    Ok(())
}

/// Prompts for a password (hidden input).
pub fn prompt_password(prompt: &str) -> CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}
