//! Admin API representations.
//!
//! Mirrors the subset of Keycloak's admin REST representations the
//! transfer needs. Field names follow the API's camelCase convention.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A user, as sent to and returned by `/admin/realms/{realm}/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// Server-assigned ID. Absent on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Username (unique within the realm).
    pub username: String,

    /// Whether the account is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the email has been verified.
    #[serde(default)]
    pub email_verified: bool,

    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Custom attributes (multi-valued).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Vec<String>>,

    /// Pending required actions (e.g., `UPDATE_PASSWORD`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_actions: Vec<String>,

    /// Credentials to set on create. Never returned by the server.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRepresentation>,
}

const fn default_enabled() -> bool {
    true
}

impl UserRepresentation {
    /// Creates a minimal representation for the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            enabled: true,
            email: None,
            email_verified: false,
            first_name: None,
            last_name: None,
            attributes: HashMap::new(),
            required_actions: Vec::new(),
            credentials: Vec::new(),
        }
    }
}

/// A credential, as used by user create and `reset-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    /// Credential type; always "password" here.
    #[serde(rename = "type")]
    pub credential_type: String,

    /// Plain-text value. Exclusive with the hashed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Keycloak secret-data JSON (`{"value": "<hash>", "salt": ""}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_data: Option<String>,

    /// Keycloak credential-data JSON
    /// (`{"hashIterations": n, "algorithm": "..."}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_data: Option<String>,

    /// Whether the user must change the password at next login.
    #[serde(default)]
    pub temporary: bool,
}

impl CredentialRepresentation {
    /// Builds a plain-text password credential.
    #[must_use]
    pub fn password(value: impl Into<String>, temporary: bool) -> Self {
        Self {
            credential_type: "password".to_string(),
            value: Some(value.into()),
            secret_data: None,
            credential_data: None,
            temporary,
        }
    }

    /// Builds a pre-hashed password credential.
    ///
    /// The hash is passed through untouched; Keycloak validates it with
    /// the named hash provider on first login.
    #[must_use]
    pub fn hashed(hash: &str, algorithm: &str, iterations: i32) -> Self {
        let secret_data = serde_json::json!({ "value": hash, "salt": "" });
        let credential_data = serde_json::json!({
            "hashIterations": iterations,
            "algorithm": algorithm,
        });

        Self {
            credential_type: "password".to_string(),
            value: None,
            secret_data: Some(secret_data.to_string()),
            credential_data: Some(credential_data.to_string()),
            temporary: false,
        }
    }
}
