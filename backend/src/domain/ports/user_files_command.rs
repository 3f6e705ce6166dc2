//! Driving port for storing files.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, FileId, UploadRequest};

/// Upload operations consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserFilesCommand: Send + Sync {
    /// Store a validated upload for `owner`.
    async fn upload(&self, owner: &AuthenticatedUser, upload: UploadRequest) -> Result<FileId, Error>;
}
