//! Admin REST API client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use tokio::sync::Mutex;

use kut_core::KeycloakConfig;

use crate::auth::{AdminToken, TokenClient};
use crate::error::{ApiError, ApiResult};
use crate::rep::{CredentialRepresentation, UserRepresentation};

/// Outcome of a user create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The user was created. Carries the new ID when the server sent a
    /// Location header.
    Created(Option<String>),

    /// The server answered 409: the username already exists.
    AlreadyExists,
}

/// Keycloak admin API client.
///
/// Transient failures (connect errors, timeouts, 5xx, 429) are retried
/// with exponential backoff by the middleware stack; the admin token is
/// cached and refreshed ahead of expiry, with one forced refresh on 401.
pub struct AdminClient {
    http: ClientWithMiddleware,
    base_url: String,
    tokens: TokenClient,
    token: Mutex<Option<AdminToken>>,
}

impl AdminClient {
    /// Creates a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &KeycloakConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let tokens = TokenClient::new(http.clone(), config.clone());

        Ok(Self {
            http,
            base_url,
            tokens,
            token: Mutex::new(None),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forces a token acquisition, verifying the configured credentials.
    pub async fn check_auth(&self) -> ApiResult<()> {
        self.bearer(true).await?;
        Ok(())
    }

    /// Checks that the server is reachable (no authentication required).
    pub async fn ping(&self, auth_realm: &str) -> ApiResult<()> {
        let url = format!(
            "{}/realms/{}/.well-known/openid-configuration",
            self.base_url,
            urlencoding::encode(auth_realm)
        );
        let response = self.http.get(&url).send().await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Looks a user up by exact username.
    pub async fn find_user_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> ApiResult<Option<UserRepresentation>> {
        let url = format!(
            "{}/admin/realms/{}/users?username={}&exact=true",
            self.base_url,
            urlencoding::encode(realm),
            urlencoding::encode(username)
        );

        let response = self.send(self.http.get(&url)).await?;
        let response = error_for_status(response).await?;
        let users: Vec<UserRepresentation> = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        // exact=true still matches case-insensitively on some versions,
        // so compare the usernames ourselves.
        Ok(users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    /// Creates a user in the realm.
    pub async fn create_user(
        &self,
        realm: &str,
        user: &UserRepresentation,
    ) -> ApiResult<CreateOutcome> {
        let url = format!(
            "{}/admin/realms/{}/users",
            self.base_url,
            urlencoding::encode(realm)
        );
        let response = self.send(self.http.post(&url).json(user)).await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let response = error_for_status(response).await?;
        let id = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| loc.rsplit('/').next())
            .map(ToString::to_string);

        Ok(CreateOutcome::Created(id))
    }

    /// Replaces a user's profile fields.
    pub async fn update_user(
        &self,
        realm: &str,
        id: &str,
        user: &UserRepresentation,
    ) -> ApiResult<()> {
        let url = format!(
            "{}/admin/realms/{}/users/{}",
            self.base_url,
            urlencoding::encode(realm),
            urlencoding::encode(id)
        );
        let response = self.send(self.http.put(&url).json(user)).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Sets a user's password credential.
    pub async fn reset_password(
        &self,
        realm: &str,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> ApiResult<()> {
        let url = format!(
            "{}/admin/realms/{}/users/{}/reset-password",
            self.base_url,
            urlencoding::encode(realm),
            urlencoding::encode(id)
        );
        let response = self.send(self.http.put(&url).json(credential)).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Sends an authenticated request, refreshing the token once on 401.
    async fn send(&self, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let retry = builder.try_clone();
        let token = self.bearer(false).await?;
        let response = builder.bearer_auth(&token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(retry) = retry {
                tracing::debug!("admin token rejected, refreshing");
                let token = self.bearer(true).await?;
                return Ok(retry.bearer_auth(&token).send().await?);
            }
        }

        Ok(response)
    }

    /// Returns a usable bearer token, acquiring or refreshing as needed.
    async fn bearer(&self, force: bool) -> ApiResult<String> {
        let mut cached = self.token.lock().await;

        if force || cached.as_ref().map_or(true, AdminToken::needs_refresh) {
            *cached = Some(self.tokens.acquire().await?);
        }

        match cached.as_ref() {
            Some(token) => Ok(token.access_token.clone()),
            None => Err(ApiError::Auth("token cache empty".to_string())),
        }
    }
}

/// Maps non-success responses to [`ApiError`].
async fn error_for_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::CONFLICT {
        Err(ApiError::Conflict(message))
    } else {
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
