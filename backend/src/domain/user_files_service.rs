//! Owner-scoped upload and listing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use super::authorization::{INVALID_TOKEN, map_credential_store_error};
use super::ports::{
    CredentialStore, NewUserFile, UserFileRepository, UserFileRepositoryError, UserFilesCommand,
    UserFilesQuery,
};
use super::{AuthenticatedUser, Error, FileId, UploadRequest, UserFile};

fn map_repository_error(error: UserFileRepositoryError) -> Error {
    match error {
        UserFileRepositoryError::OwnerMissing { .. } => Error::unauthorized(INVALID_TOKEN),
        other => {
            error!(error = %other, "file repository operation failed");
            Error::internal(other.to_string())
        }
    }
}

/// Domain implementation of [`UserFilesCommand`] and [`UserFilesQuery`].
pub struct UserFilesService<S, F> {
    users: Arc<S>,
    files: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<S, F> UserFilesService<S, F> {
    /// Create the service over the credential store and file repository.
    pub fn new(users: Arc<S>, files: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            files,
            clock,
        }
    }
}

impl<S, F> UserFilesService<S, F>
where
    S: CredentialStore,
{
    async fn ensure_owner_exists(&self, owner: &AuthenticatedUser) -> Result<(), Error> {
        let found = self
            .users
            .find_by_id(owner.id())
            .await
            .map_err(map_credential_store_error)?;
        match found {
            Some(_) => Ok(()),
            None => Err(Error::unauthorized(INVALID_TOKEN)),
        }
    }
}

#[async_trait]
impl<S, F> UserFilesCommand for UserFilesService<S, F>
where
    S: CredentialStore,
    F: UserFileRepository,
{
    async fn upload(&self, owner: &AuthenticatedUser, upload: UploadRequest) -> Result<FileId, Error> {
        self.ensure_owner_exists(owner).await?;

        let (file_name, payload) = upload.into_parts();
        let size = payload.len();
        let file = NewUserFile {
            owner: *owner.id(),
            file_name,
            payload,
            created_at: self.clock.utc(),
        };
        let id = self.files.insert(&file).await.map_err(map_repository_error)?;

        info!(user_id = %owner.id(), file_id = %id, size, "file stored");
        Ok(id)
    }
}

#[async_trait]
impl<S, F> UserFilesQuery for UserFilesService<S, F>
where
    S: CredentialStore,
    F: UserFileRepository,
{
    async fn list(&self, owner: &AuthenticatedUser) -> Result<Vec<UserFile>, Error> {
        self.files
            .list_for_owner(owner.id())
            .await
            .map_err(map_repository_error)
    }
}
