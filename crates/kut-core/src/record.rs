//! Normalized source row model.
//!
//! The source schema is user-defined, so rows are carried as a flat
//! column-name → value map. The database layer normalizes every supported
//! column type to a string; NULLs are kept distinct from empty strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single row read from the source database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    /// Value of the ordering column, used to identify the row in reports.
    pub key: String,

    /// Column values. NULL columns are present with a `None` value.
    pub columns: BTreeMap<String, Option<String>>,
}

impl SourceRow {
    /// Creates an empty row with the given key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Sets a column value.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.columns
            .insert(name.into(), value.map(ToString::to_string));
        self
    }

    /// Returns the non-NULL value of a column, if the column exists.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Returns true when the column exists in the row (NULL or not).
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Parses a column as a boolean.
    ///
    /// Accepts `t`/`true`/`1`/`yes` and `f`/`false`/`0`/`no`,
    /// case-insensitively. Returns `None` for NULL, missing, or
    /// unrecognized values.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        match self.get(column)?.to_ascii_lowercase().as_str() {
            "t" | "true" | "1" | "yes" => Some(true),
            "f" | "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_filters_null_and_blank() {
        let row = SourceRow::new("1")
            .with_column("email", Some("a@b.c"))
            .with_column("first_name", Some("  "))
            .with_column("last_name", None);

        assert_eq!(row.get("email"), Some("a@b.c"));
        assert_eq!(row.get("first_name"), None);
        assert_eq!(row.get("last_name"), None);
        assert_eq!(row.get("missing"), None);
        assert!(row.has_column("last_name"));
        assert!(!row.has_column("missing"));
    }

    #[test]
    fn bool_parsing() {
        let row = SourceRow::new("1")
            .with_column("a", Some("t"))
            .with_column("b", Some("FALSE"))
            .with_column("c", Some("1"))
            .with_column("d", Some("maybe"))
            .with_column("e", None);

        assert_eq!(row.get_bool("a"), Some(true));
        assert_eq!(row.get_bool("b"), Some(false));
        assert_eq!(row.get_bool("c"), Some(true));
        assert_eq!(row.get_bool("d"), None);
        assert_eq!(row.get_bool("e"), None);
    }

    #[test]
    fn values_are_trimmed() {
        let row = SourceRow::new("1").with_column("username", Some("  jdoe "));
        assert_eq!(row.get("username"), Some("jdoe"));
    }
}
