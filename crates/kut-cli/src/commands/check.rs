//! The `check` command: connectivity and authentication tests.

use std::path::Path;

use kut_keycloak::AdminClient;
use kut_source::{create_pool, PgUserSource, PoolConfig};

use crate::error::CliResult;
use crate::output::{error, success};

use super::load_config;

/// Checks the database connection and Keycloak authentication.
///
/// Returns the process exit code: 0 when every check passes, 1 otherwise.
pub async fn run_check(config_path: &Path) -> CliResult<i32> {
    let config = load_config(config_path)?;
    let mut ok = true;

    // Database: pool + SELECT 1 + row count.
    let columns = vec![config.mapping.username.clone()];
    match create_pool(&PoolConfig::from(&config.source)).await {
        Ok(pool) => match PgUserSource::new(pool, &config.source, columns) {
            Ok(source) => match source.count().await {
                Ok(count) => success(&format!("database reachable, {count} source rows")),
                Err(e) => {
                    error(&format!("database query failed: {e}"));
                    ok = false;
                }
            },
            Err(e) => {
                error(&format!("source configuration invalid: {e}"));
                ok = false;
            }
        },
        Err(e) => {
            error(&format!("database connection failed: {e}"));
            ok = false;
        }
    }

    // Keycloak: liveness + token.
    match AdminClient::new(&config.keycloak) {
        Ok(client) => {
            match client.ping(&config.keycloak.auth_realm).await {
                Ok(()) => success(&format!("Keycloak reachable at {}", client.base_url())),
                Err(e) => {
                    error(&format!("Keycloak not reachable: {e}"));
                    ok = false;
                }
            }
            match client.check_auth().await {
                Ok(()) => success("admin authentication succeeded"),
                Err(e) => {
                    error(&format!("admin authentication failed: {e}"));
                    ok = false;
                }
            }
        }
        Err(e) => {
            error(&format!("cannot build HTTP client: {e}"));
            ok = false;
        }
    }

    Ok(i32::from(!ok))
}
