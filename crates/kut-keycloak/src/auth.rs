//! Admin token acquisition.
//!
//! Tokens come from the OpenID Connect token endpoint of the auth realm,
//! using either the `client_credentials` grant (service account) or the
//! `password` grant (admin user + `admin-cli`).

use std::time::{Duration, Instant};

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use kut_core::KeycloakConfig;

use crate::error::{ApiError, ApiResult};

/// Expiry leeway: a token this close to expiring is refreshed early.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

/// An acquired admin access token.
#[derive(Debug, Clone)]
pub struct AdminToken {
    /// Bearer token value.
    pub access_token: String,
    acquired_at: Instant,
    expires_in: Duration,
}

impl AdminToken {
    /// Returns true when the token is expired or about to expire.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.acquired_at.elapsed() + EXPIRY_LEEWAY >= self.expires_in
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

const fn default_expires_in() -> u64 {
    60
}

/// Client for the OIDC token endpoint.
pub struct TokenClient {
    http: ClientWithMiddleware,
    token_url: String,
    config: KeycloakConfig,
}

impl TokenClient {
    /// Creates a token client for the configured auth realm.
    #[must_use]
    pub fn new(http: ClientWithMiddleware, config: KeycloakConfig) -> Self {
        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            config.base_url.trim_end_matches('/'),
            urlencoding::encode(&config.auth_realm)
        );
        Self {
            http,
            token_url,
            config,
        }
    }

    /// Acquires a fresh admin token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when the server rejects the credentials
    /// and [`ApiError::Http`] for transport failures.
    pub async fn acquire(&self) -> ApiResult<AdminToken> {
        let mut form: Vec<(&str, &str)> = vec![("client_id", &self.config.client_id)];

        if let Some(username) = &self.config.username {
            form.push(("grant_type", "password"));
            form.push(("username", username));
            let password = self.config.password.as_deref().unwrap_or_default();
            form.push(("password", password));
            if let Some(secret) = &self.config.client_secret {
                form.push(("client_secret", secret));
            }
        } else if let Some(secret) = &self.config.client_secret {
            form.push(("grant_type", "client_credentials"));
            form.push(("client_secret", secret));
        } else {
            return Err(ApiError::Auth(
                "no client_secret or username configured".to_string(),
            ));
        }

        let acquired_at = Instant::now();
        let response = self.http.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        tracing::debug!(expires_in = token.expires_in, "acquired admin token");

        Ok(AdminToken {
            access_token: token.access_token,
            acquired_at,
            expires_in: Duration::from_secs(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_does_not_need_refresh() {
        let token = AdminToken {
            access_token: "abc".to_string(),
            acquired_at: Instant::now(),
            expires_in: Duration::from_secs(300),
        };
        assert!(!token.needs_refresh());
    }

    #[test]
    fn short_lived_token_needs_refresh() {
        let token = AdminToken {
            access_token: "abc".to_string(),
            acquired_at: Instant::now(),
            expires_in: Duration::from_secs(10),
        };
        // 10s lifetime is inside the 30s leeway.
        assert!(token.needs_refresh());
    }
}
