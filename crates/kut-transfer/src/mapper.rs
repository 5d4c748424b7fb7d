//! Row-to-user mapping.
//!
//! Applies the configured column mapping to a [`SourceRow`], producing
//! the Keycloak representation to create or update. The firstName /
//! lastName / email / enabled fields are mapped onto the built-in user
//! fields; everything else becomes a custom attribute.

use kut_core::{MappingConfig, SourceRow, TransferConfig};
use kut_keycloak::{CredentialRepresentation, UserRepresentation};

use crate::error::{TransferError, TransferResult};

/// A source row mapped to its Keycloak form.
#[derive(Debug, Clone)]
pub struct MappedUser {
    /// Ordering-column value of the source row.
    pub source_key: String,

    /// The user to create or update. Does not carry credentials.
    pub user: UserRepresentation,

    /// Password credential, when a password column is mapped.
    pub credential: Option<CredentialRepresentation>,
}

/// Applies a [`MappingConfig`] to source rows.
#[derive(Debug, Clone)]
pub struct RowMapper {
    mapping: MappingConfig,
    transfer: TransferConfig,
}

impl RowMapper {
    /// Creates a mapper.
    #[must_use]
    pub const fn new(mapping: MappingConfig, transfer: TransferConfig) -> Self {
        Self { mapping, transfer }
    }

    /// Maps one row.
    ///
    /// # Errors
    ///
    /// Returns a mapping error when the username column is missing, NULL,
    /// or empty, or when a mapped boolean column holds an unrecognized
    /// value. NULLs elsewhere simply leave the field absent.
    pub fn map_row(&self, row: &SourceRow) -> TransferResult<MappedUser> {
        let username = self.map_username(row)?;

        let mut user = UserRepresentation::new(username);
        user.email = self.mapping.email.as_deref().and_then(|c| owned(row, c));
        user.first_name = self
            .mapping
            .first_name
            .as_deref()
            .and_then(|c| owned(row, c));
        user.last_name = self
            .mapping
            .last_name
            .as_deref()
            .and_then(|c| owned(row, c));
        user.enabled = self.map_flag(row, self.mapping.enabled.as_deref())?
            .unwrap_or(self.transfer.default_enabled);
        user.email_verified = self
            .map_flag(row, self.mapping.email_verified.as_deref())?
            .unwrap_or(false);

        for (attribute, column) in &self.mapping.attributes {
            if let Some(value) = row.get(column) {
                user.attributes
                    .insert(attribute.clone(), vec![value.to_string()]);
            }
        }

        let credential = self.map_credential(row);

        Ok(MappedUser {
            source_key: row.key.clone(),
            user,
            credential,
        })
    }

    fn map_username(&self, row: &SourceRow) -> TransferResult<String> {
        let column = self.mapping.username.as_str();
        if !row.has_column(column) {
            return Err(TransferError::mapping(format!(
                "username column '{column}' missing from result set"
            )));
        }
        match row.get(column) {
            // Keycloak stores usernames lowercased.
            Some(value) => Ok(value.to_lowercase()),
            None => Err(TransferError::mapping(format!(
                "username column '{column}' is NULL or empty"
            ))),
        }
    }

    /// Parses an optionally-mapped boolean column. `Ok(None)` means the
    /// column is unmapped, missing, or NULL.
    fn map_flag(&self, row: &SourceRow, column: Option<&str>) -> TransferResult<Option<bool>> {
        let Some(column) = column else {
            return Ok(None);
        };
        match row.get(column) {
            None => Ok(None),
            Some(value) => match row.get_bool(column) {
                Some(flag) => Ok(Some(flag)),
                None => Err(TransferError::mapping(format!(
                    "column '{column}' holds non-boolean value '{value}'"
                ))),
            },
        }
    }

    fn map_credential(&self, row: &SourceRow) -> Option<CredentialRepresentation> {
        if let Some(column) = self.mapping.password_hash.as_deref() {
            let hash = row.get(column)?;
            return Some(CredentialRepresentation::hashed(
                hash,
                &self.mapping.hash_algorithm,
                self.mapping.hash_iterations,
            ));
        }
        if let Some(column) = self.mapping.password.as_deref() {
            let value = row.get(column)?;
            return Some(CredentialRepresentation::password(
                value,
                self.transfer.temporary_passwords,
            ));
        }
        None
    }
}

fn owned(row: &SourceRow, column: &str) -> Option<String> {
    row.get(column).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn mapping() -> MappingConfig {
        MappingConfig {
            username: "login".to_string(),
            email: Some("mail".to_string()),
            first_name: Some("given".to_string()),
            last_name: Some("family".to_string()),
            enabled: Some("active".to_string()),
            email_verified: None,
            password: None,
            password_hash: None,
            hash_algorithm: "bcrypt".to_string(),
            hash_iterations: -1,
            attributes: BTreeMap::from([("department".to_string(), "dept".to_string())]),
        }
    }

    fn row() -> SourceRow {
        SourceRow::new("7")
            .with_column("login", Some("JDoe"))
            .with_column("mail", Some("jdoe@example.com"))
            .with_column("given", Some("Jane"))
            .with_column("family", None)
            .with_column("active", Some("t"))
            .with_column("dept", Some("R&D"))
    }

    #[test]
    fn maps_fields_and_attributes() {
        let mapper = RowMapper::new(mapping(), TransferConfig::default());
        let mapped = mapper.map_row(&row()).unwrap();

        assert_eq!(mapped.source_key, "7");
        assert_eq!(mapped.user.username, "jdoe");
        assert_eq!(mapped.user.email.as_deref(), Some("jdoe@example.com"));
        assert_eq!(mapped.user.first_name.as_deref(), Some("Jane"));
        assert_eq!(mapped.user.last_name, None);
        assert!(mapped.user.enabled);
        assert_eq!(
            mapped.user.attributes.get("department"),
            Some(&vec!["R&D".to_string()])
        );
        assert!(mapped.credential.is_none());
    }

    #[test]
    fn null_username_is_a_mapping_error() {
        let mapper = RowMapper::new(mapping(), TransferConfig::default());
        let row = row().with_column("login", None);
        let err = mapper.map_row(&row).unwrap_err();
        assert!(err.to_string().contains("NULL or empty"));
    }

    #[test]
    fn missing_username_column_is_a_mapping_error() {
        let mapper = RowMapper::new(mapping(), TransferConfig::default());
        let mut row = row();
        row.columns.remove("login");
        let err = mapper.map_row(&row).unwrap_err();
        assert!(err.to_string().contains("missing from result set"));
    }

    #[test]
    fn null_enabled_falls_back_to_default() {
        let transfer = TransferConfig {
            default_enabled: false,
            ..TransferConfig::default()
        };
        let mapper = RowMapper::new(mapping(), transfer);
        let row = row().with_column("active", None);
        let mapped = mapper.map_row(&row).unwrap();
        assert!(!mapped.user.enabled);
    }

    #[test]
    fn garbage_enabled_value_is_a_mapping_error() {
        let mapper = RowMapper::new(mapping(), TransferConfig::default());
        let row = row().with_column("active", Some("banana"));
        let err = mapper.map_row(&row).unwrap_err();
        assert!(err.to_string().contains("non-boolean"));
    }

    #[test]
    fn plain_password_credential_honors_temporary_flag() {
        let mut mapping = mapping();
        mapping.password = Some("pw".to_string());
        let transfer = TransferConfig {
            temporary_passwords: true,
            ..TransferConfig::default()
        };
        let mapper = RowMapper::new(mapping, transfer);
        let row = row().with_column("pw", Some("hunter2"));

        let mapped = mapper.map_row(&row).unwrap();
        let cred = mapped.credential.unwrap();
        assert_eq!(cred.value.as_deref(), Some("hunter2"));
        assert!(cred.temporary);
    }

    #[test]
    fn hashed_password_credential() {
        let mut mapping = mapping();
        mapping.password_hash = Some("digest".to_string());
        let mapper = RowMapper::new(mapping, TransferConfig::default());
        let row = row().with_column("digest", Some("$2b$12$abc"));

        let mapped = mapper.map_row(&row).unwrap();
        let cred = mapped.credential.unwrap();
        assert!(cred.value.is_none());
        assert!(cred.secret_data.unwrap().contains("$2b$12$abc"));
    }

}
