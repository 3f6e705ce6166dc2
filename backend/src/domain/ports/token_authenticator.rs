//! Driving port resolving a bearer credential to an account.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, BearerToken, Error};

/// Resolve a presented token to the account it currently authorises.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Accept only tokens that verify and still match the stored live token.
    async fn authenticate(&self, token: &BearerToken) -> Result<AuthenticatedUser, Error>;
}
