//! Port for persisted account state.
//!
//! The credential store owns user records: identity, password digest, the
//! single live token and the last logout time. Email uniqueness is enforced
//! here, not by callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BearerToken, DisplayName, EmailAddress, PasswordDigest, UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "credential store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "credential store query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } =>
            "email already registered: {email}",
        /// No account exists for this email.
        NotFound { email: String } =>
            "no account registered for {email}",
    }
}

/// Values written when an account is created.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: EmailAddress,
    pub password_hash: PasswordDigest,
    pub display_name: DisplayName,
    /// Token issued during registration; becomes the live token.
    pub token: BearerToken,
}

/// Port for account persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create an account, returning its new identifier.
    ///
    /// Fails with [`CredentialStoreError::DuplicateEmail`] when the email is
    /// already registered.
    async fn insert_user(&self, record: &NewUserRecord) -> Result<UserId, CredentialStoreError>;

    /// Look an account up by identity.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, CredentialStoreError>;

    /// Look an account up by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, CredentialStoreError>;

    /// Replace the live token, invalidating any earlier one.
    async fn set_token(
        &self,
        email: &EmailAddress,
        token: &BearerToken,
    ) -> Result<(), CredentialStoreError>;

    /// Clear the live token and stamp the logout time.
    async fn clear_token(
        &self,
        email: &EmailAddress,
        logout_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;
}
