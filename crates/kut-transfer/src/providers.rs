//! Engine trait implementations for the real source and sink.

use async_trait::async_trait;

use kut_core::SourceRow;
use kut_keycloak::{
    AdminClient, ApiError, CreateOutcome, CredentialRepresentation, UserRepresentation,
};
use kut_source::{PgUserSource, SourceError};

use crate::engine::{RowSource, UserSink};

#[async_trait]
impl RowSource for PgUserSource {
    async fn count(&self) -> Result<u64, SourceError> {
        PgUserSource::count(self).await
    }

    fn batch_size(&self) -> u32 {
        PgUserSource::batch_size(self)
    }

    async fn fetch_batch(&self, offset: u64) -> Result<Vec<SourceRow>, SourceError> {
        PgUserSource::fetch_batch(self, offset).await
    }
}

#[async_trait]
impl UserSink for AdminClient {
    async fn find_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Option<UserRepresentation>, ApiError> {
        self.find_user_by_username(realm, username).await
    }

    async fn create(
        &self,
        realm: &str,
        user: &UserRepresentation,
    ) -> Result<CreateOutcome, ApiError> {
        self.create_user(realm, user).await
    }

    async fn update(
        &self,
        realm: &str,
        id: &str,
        user: &UserRepresentation,
    ) -> Result<(), ApiError> {
        self.update_user(realm, id, user).await
    }

    async fn reset_password(
        &self,
        realm: &str,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> Result<(), ApiError> {
        AdminClient::reset_password(self, realm, id, credential).await
    }
}
