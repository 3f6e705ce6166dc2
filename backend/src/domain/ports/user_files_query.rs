//! Driving port for reading the caller's files.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, UserFile};

/// File listing consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserFilesQuery: Send + Sync {
    /// Every file owned by `owner`; never another account's.
    async fn list(&self, owner: &AuthenticatedUser) -> Result<Vec<UserFile>, Error>;
}
