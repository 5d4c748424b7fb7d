//! Batched row reading from the source table or query.
//!
//! The source schema is user-defined, so rows are decoded dynamically:
//! only the columns the mapping references are extracted, and every
//! supported column type is normalized to its string form.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row};
use uuid::Uuid;

use kut_core::{SourceConfig, SourceRow};

use crate::error::{from_sqlx_error, SourceError, SourceResult};

/// PostgreSQL user source.
///
/// Pages through the configured table (or custom query, wrapped as a
/// subselect) with a stable `ORDER BY` so that a one-shot run visits
/// every row exactly once.
pub struct PgUserSource {
    pool: PgPool,
    relation: String,
    order_by: String,
    batch_size: u32,
    columns: Vec<String>,
}

impl PgUserSource {
    /// Creates a new source for the given configuration.
    ///
    /// `columns` is the set of source columns the mapping references;
    /// only these are decoded from each row.
    ///
    /// # Errors
    ///
    /// Returns an error when the table or ordering column is not a safe
    /// SQL identifier.
    pub fn new(
        pool: PgPool,
        config: &SourceConfig,
        columns: Vec<String>,
    ) -> SourceResult<Self> {
        let relation = match (&config.table, &config.query) {
            (Some(table), _) => quote_relation(table)?,
            (None, Some(query)) => format!("({query}) AS src"),
            (None, None) => {
                return Err(SourceError::InvalidIdentifier(
                    "no table or query configured".to_string(),
                ))
            }
        };

        Ok(Self {
            pool,
            relation,
            order_by: quote_identifier(&config.order_by)?,
            batch_size: config.batch_size,
            columns,
        })
    }

    /// Verifies that the database is reachable.
    pub async fn test_connection(&self) -> SourceResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(from_sqlx_error)?;
        Ok(())
    }

    /// Counts the rows the transfer will visit.
    pub async fn count(&self) -> SourceResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", self.relation))
                .fetch_one(&self.pool)
                .await
                .map_err(from_sqlx_error)?;

        #[allow(clippy::cast_sign_loss)]
        Ok(count as u64)
    }

    /// Returns the configured batch size.
    #[must_use]
    pub const fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Fetches one batch of rows starting at `offset`.
    ///
    /// A batch shorter than the batch size means the source is exhausted.
    pub async fn fetch_batch(&self, offset: u64) -> SourceResult<Vec<SourceRow>> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
            self.relation, self.order_by
        );

        #[allow(clippy::cast_possible_wrap)]
        let rows: Vec<PgRow> = sqlx::query(&sql)
            .bind(i64::from(self.batch_size))
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        tracing::debug!(offset, rows = rows.len(), "fetched source batch");

        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    /// Decodes the referenced columns of one row.
    ///
    /// Columns absent from the result set are left out of the row; the
    /// mapper reports those per record instead of aborting the run.
    fn decode_row(&self, row: &PgRow) -> SourceResult<SourceRow> {
        let available: HashSet<&str> = row.columns().iter().map(Column::name).collect();

        let order_name = unquote(&self.order_by);
        let key = if available.contains(order_name) {
            decode_column(row, order_name)?.unwrap_or_else(|| "<null>".to_string())
        } else {
            "<unknown>".to_string()
        };

        let mut source_row = SourceRow::new(key);
        for column in &self.columns {
            if !available.contains(column.as_str()) {
                continue;
            }
            let value = decode_column(row, column)?;
            source_row
                .columns
                .insert(column.clone(), value);
        }

        Ok(source_row)
    }
}

/// Decodes a single column to its string form, trying the supported
/// Postgres types in order.
fn decode_column(row: &PgRow, name: &str) -> SourceResult<Option<String>> {
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<Uuid>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(name) {
        return Ok(v.map(|x| x.to_rfc3339()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return Ok(v.map(|x| x.to_string()));
    }

    Err(SourceError::Decode {
        column: name.to_string(),
        message: "unsupported column type".to_string(),
    })
}

/// Quotes a possibly schema-qualified relation name.
fn quote_relation(name: &str) -> SourceResult<String> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(SourceError::InvalidIdentifier(name.to_string()));
    }
    let quoted: SourceResult<Vec<String>> = parts.iter().map(|p| quote_identifier(p)).collect();
    Ok(quoted?.join("."))
}

/// Quotes a single SQL identifier, rejecting anything that is not a
/// plain name.
fn quote_identifier(name: &str) -> SourceResult<String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(SourceError::InvalidIdentifier(name.to_string()))
    }
}

/// Strips the quoting added by [`quote_identifier`].
fn unquote(name: &str) -> &str {
    name.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier("users").unwrap(), "\"users\"");
        assert_eq!(quote_relation("public.users").unwrap(), "\"public\".\"users\"");
    }

    #[test]
    fn unsafe_identifiers_rejected() {
        assert!(quote_identifier("users; DROP TABLE users").is_err());
        assert!(quote_identifier("").is_err());
        assert!(quote_relation("a.b.c.d").is_err());
    }

    #[test]
    fn unquote_round_trips() {
        assert_eq!(unquote(&quote_identifier("id").unwrap()), "id");
    }
}
