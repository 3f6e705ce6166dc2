//! Port for owner-scoped file persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FileId, FileName, FilePayload, UserFile, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by file repository adapters.
    pub enum UserFileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "file repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "file repository query failed: {message}",
        /// The owning account no longer exists.
        OwnerMissing { owner: String } =>
            "file owner {owner} does not exist",
    }
}

/// Values written for a new file.
#[derive(Debug, Clone)]
pub struct NewUserFile {
    pub owner: UserId,
    pub file_name: FileName,
    pub payload: FilePayload,
    pub created_at: DateTime<Utc>,
}

/// Port for file storage. Every read is scoped to a single owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserFileRepository: Send + Sync {
    /// Store a file and return its identifier.
    async fn insert(&self, file: &NewUserFile) -> Result<FileId, UserFileRepositoryError>;

    /// Files owned by `owner`, oldest first with ties broken by id.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<UserFile>, UserFileRepositoryError>;
}
