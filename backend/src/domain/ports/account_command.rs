//! Driving port for the account lifecycle: register, login and logout.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, IssuedToken, LoginCredentials, Registration, User};

/// Outcome of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Public view of the account.
    pub user: User,
    /// Token that is now the account's only live credential.
    pub token: IssuedToken,
}

/// Account lifecycle operations consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Verify credentials and rotate the live token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Revoke the caller's live token.
    async fn logout(&self, user: &AuthenticatedUser) -> Result<(), Error>;
}
