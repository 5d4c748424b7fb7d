//! The `validate` command: configuration inspection.

use std::path::Path;

use tabled::{settings::Style, Table, Tabled};

use kut_core::Config;

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::output::success;

/// Mapping table row.
#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "User Field")]
    field: String,
    #[tabled(rename = "Source Column")]
    column: String,
}

/// Validates the configuration file and prints the effective mapping.
pub fn run_validate(config_path: &Path, format: OutputFormat) -> CliResult<i32> {
    // No password prompt here: validation never talks to the server.
    let config = Config::from_yaml_file(config_path)?;

    match format {
        OutputFormat::Table => {
            let rows = mapping_rows(&config);
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config.mapping)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }

    success(&format!(
        "configuration valid: realm '{}' on {}",
        config.keycloak.realm, config.keycloak.base_url
    ));
    Ok(0)
}

fn mapping_rows(config: &Config) -> Vec<MappingRow> {
    let mapping = &config.mapping;
    let mut rows = vec![MappingRow {
        field: "username".to_string(),
        column: mapping.username.clone(),
    }];

    let optional = [
        ("email", &mapping.email),
        ("firstName", &mapping.first_name),
        ("lastName", &mapping.last_name),
        ("enabled", &mapping.enabled),
        ("emailVerified", &mapping.email_verified),
        ("password", &mapping.password),
        ("password (hashed)", &mapping.password_hash),
    ];
    for (field, column) in optional {
        if let Some(column) = column {
            rows.push(MappingRow {
                field: field.to_string(),
                column: column.clone(),
            });
        }
    }

    for (attribute, column) in &mapping.attributes {
        rows.push(MappingRow {
            field: format!("attribute '{attribute}'"),
            column: column.clone(),
        });
    }

    rows
}
