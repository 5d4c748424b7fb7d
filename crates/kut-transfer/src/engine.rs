//! The transfer engine.
//!
//! Pages through the source, maps each row, and creates or updates the
//! corresponding Keycloak user. One bad record never aborts the run
//! (unless `fail_fast`); reruns are idempotent because every row is
//! looked up by username before any write.

use async_trait::async_trait;

use kut_core::{Config, RecordError, SourceRow, TransferConfig, TransferReport};
use kut_keycloak::{ApiError, CreateOutcome, CredentialRepresentation, UserRepresentation};
use kut_source::SourceError;

use crate::error::TransferResult;
use crate::mapper::{MappedUser, RowMapper};

/// Batched row supplier. Implemented by the PostgreSQL source and by
/// in-memory fakes in tests.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Counts the rows the transfer will visit.
    async fn count(&self) -> Result<u64, SourceError>;

    /// Rows per batch.
    fn batch_size(&self) -> u32;

    /// Fetches one batch starting at `offset`. A short batch means the
    /// source is exhausted.
    async fn fetch_batch(&self, offset: u64) -> Result<Vec<SourceRow>, SourceError>;
}

/// User write target. Implemented by the admin API client and by
/// in-memory fakes in tests.
#[async_trait]
pub trait UserSink: Send + Sync {
    /// Looks a user up by exact username.
    async fn find_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Option<UserRepresentation>, ApiError>;

    /// Creates a user.
    async fn create(
        &self,
        realm: &str,
        user: &UserRepresentation,
    ) -> Result<CreateOutcome, ApiError>;

    /// Replaces a user's profile fields.
    async fn update(
        &self,
        realm: &str,
        id: &str,
        user: &UserRepresentation,
    ) -> Result<(), ApiError>;

    /// Sets a user's password credential.
    async fn reset_password(
        &self,
        realm: &str,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> Result<(), ApiError>;
}

/// Outcome of one record.
enum RowOutcome {
    Added,
    Updated,
    Skipped,
}

/// Runs the transfer.
pub struct TransferEngine<'a, S, K> {
    source: &'a S,
    sink: &'a K,
    realm: String,
    options: TransferConfig,
    mapper: RowMapper,
}

impl<'a, S: RowSource, K: UserSink> TransferEngine<'a, S, K> {
    /// Creates an engine from the loaded configuration.
    #[must_use]
    pub fn new(source: &'a S, sink: &'a K, config: &Config) -> Self {
        Self {
            source,
            sink,
            realm: config.keycloak.realm.clone(),
            options: config.transfer.clone(),
            mapper: RowMapper::new(config.mapping.clone(), config.transfer.clone()),
        }
    }

    /// Overrides the dry-run switch (CLI flag beats config).
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = self.options.dry_run || dry_run;
        self
    }

    /// Overrides the update-existing switch.
    #[must_use]
    pub fn update_existing(mut self, update: bool) -> Self {
        self.options.update_existing = self.options.update_existing || update;
        self
    }

    /// Runs the transfer to completion.
    ///
    /// # Errors
    ///
    /// Returns an error only for whole-run failures (source fetch,
    /// authentication). Per-record failures land in the report.
    pub async fn run(&self) -> TransferResult<TransferReport> {
        let mut report = TransferReport::new(self.options.dry_run);

        let total = self.source.count().await?;
        tracing::info!(
            total,
            realm = %self.realm,
            dry_run = self.options.dry_run,
            "starting user transfer"
        );

        let batch_size = self.source.batch_size() as usize;
        let mut offset: u64 = 0;

        'outer: loop {
            let batch = self.source.fetch_batch(offset).await?;
            let fetched = batch.len();

            for row in &batch {
                match self.transfer_row(row).await {
                    Ok(RowOutcome::Added) => report.record_added(),
                    Ok(RowOutcome::Updated) => report.record_updated(),
                    Ok(RowOutcome::Skipped) => report.record_skipped(),
                    Err(error) => {
                        tracing::warn!(
                            source_key = %error.source_key,
                            username = error.username.as_deref().unwrap_or("<unmapped>"),
                            "record failed: {}",
                            error.message
                        );
                        report.record_failure(error);
                        if self.options.fail_fast {
                            tracing::error!("aborting after first failure (fail_fast)");
                            break 'outer;
                        }
                    }
                }
            }

            offset += fetched as u64;
            tracing::info!(processed = report.total(), total, "transfer progress");

            if fetched < batch_size {
                break;
            }
        }

        Ok(report.complete())
    }

    /// Transfers a single row, classifying the outcome.
    async fn transfer_row(&self, row: &SourceRow) -> Result<RowOutcome, RecordError> {
        let mapped = self
            .mapper
            .map_row(row)
            .map_err(|e| RecordError::new(&row.key, e.to_string()))?;
        let username = mapped.user.username.clone();
        let fail = |message: String| RecordError::new(&row.key, message).with_username(&username);

        let existing = self
            .sink
            .find_by_username(&self.realm, &username)
            .await
            .map_err(|e| fail(e.to_string()))?;

        if self.options.dry_run {
            return Ok(match existing {
                None => RowOutcome::Added,
                Some(_) if self.options.update_existing => RowOutcome::Updated,
                Some(_) => RowOutcome::Skipped,
            });
        }

        match existing {
            None => match self.create(&mapped).await.map_err(|e| fail(e.to_string()))? {
                CreateOutcome::Created(_) => {
                    tracing::debug!(%username, "user created");
                    Ok(RowOutcome::Added)
                }
                // Lost a race: someone created the username since the
                // lookup. Resolve it like a pre-existing user.
                CreateOutcome::AlreadyExists => {
                    if self.options.update_existing {
                        self.update_existing_user(&mapped, &username)
                            .await
                            .map_err(|e| fail(e.to_string()))?;
                        Ok(RowOutcome::Updated)
                    } else {
                        Ok(RowOutcome::Skipped)
                    }
                }
            },
            Some(current) => {
                if !self.options.update_existing {
                    tracing::debug!(%username, "user exists, skipping");
                    return Ok(RowOutcome::Skipped);
                }
                let id = current
                    .id
                    .ok_or_else(|| fail("server returned user without id".to_string()))?;
                self.apply_update(&mapped, &id)
                    .await
                    .map_err(|e| fail(e.to_string()))?;
                Ok(RowOutcome::Updated)
            }
        }
    }

    /// Creates a user, with the credential inlined so pre-hashed
    /// passwords import in the same call.
    ///
    /// Required actions apply to new accounts only; updates leave an
    /// existing user's pending actions alone.
    async fn create(&self, mapped: &MappedUser) -> Result<CreateOutcome, ApiError> {
        let mut user = mapped.user.clone();
        user.required_actions = self.options.required_actions.clone();
        if let Some(credential) = &mapped.credential {
            user.credentials.push(credential.clone());
        }
        self.sink.create(&self.realm, &user).await
    }

    /// Re-finds a user that appeared between lookup and create, then
    /// updates it.
    async fn update_existing_user(
        &self,
        mapped: &MappedUser,
        username: &str,
    ) -> Result<(), ApiError> {
        let current = self
            .sink
            .find_by_username(&self.realm, username)
            .await?
            .ok_or_else(|| {
                ApiError::InvalidResponse("user reported as existing but not found".to_string())
            })?;
        let id = current.id.ok_or_else(|| {
            ApiError::InvalidResponse("server returned user without id".to_string())
        })?;
        self.apply_update(mapped, &id).await
    }

    /// Updates profile fields and, for plain passwords, the credential.
    async fn apply_update(&self, mapped: &MappedUser, id: &str) -> Result<(), ApiError> {
        self.sink.update(&self.realm, id, &mapped.user).await?;

        if let Some(credential) = &mapped.credential {
            if credential.value.is_some() {
                self.sink
                    .reset_password(&self.realm, id, credential)
                    .await?;
            } else {
                // reset-password hashes its input, so a pre-hashed
                // credential can only be imported at create time.
                tracing::debug!(
                    username = %mapped.user.username,
                    "skipping pre-hashed credential for existing user"
                );
            }
        }

        tracing::debug!(username = %mapped.user.username, "user updated");
        Ok(())
    }
}
