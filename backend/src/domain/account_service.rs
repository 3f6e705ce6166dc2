//! Account lifecycle service: registration, login and logout.
//!
//! Password hashing runs on the blocking pool. Unknown identities are
//! verified against a dummy digest so login timing does not reveal whether
//! an account exists.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info};

use super::authorization::{INVALID_TOKEN, map_credential_store_error};
use super::password::PasswordHasher;
use super::ports::{AccountCommand, AuthSession, CredentialStore, CredentialStoreError, NewUserRecord};
use super::token::{TokenIssueError, TokenIssuer};
use super::{AuthenticatedUser, Error, LoginCredentials, Registration, User};

/// Message returned for every failed login.
pub(crate) const INVALID_CREDENTIALS: &str = "invalid credentials";

async fn run_blocking<T, F>(task: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| {
        error!(error = %err, "password hashing task failed");
        Error::internal(format!("password hashing task failed: {err}"))
    })
}

fn map_issue_error(error: TokenIssueError) -> Error {
    error!(%error, "token issuance failed");
    Error::internal(error.to_string())
}

/// Domain implementation of [`AccountCommand`].
pub struct AccountService<S> {
    store: Arc<S>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl<S> AccountService<S> {
    /// Create the service over a credential store.
    pub fn new(
        store: Arc<S>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            clock,
        }
    }
}

#[async_trait]
impl<S> AccountCommand for AccountService<S>
where
    S: CredentialStore,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let hasher = self.hasher.clone();
        let password = registration.password_buffer();
        let password_hash = run_blocking(move || hasher.hash(&password))
            .await?
            .map_err(|err| {
                error!(error = %err, "password hashing failed");
                Error::internal(err.to_string())
            })?;

        let issued = self.tokens.issue(registration.email()).map_err(map_issue_error)?;
        let record = NewUserRecord {
            email: registration.email().clone(),
            password_hash,
            display_name: registration.display_name().clone(),
            token: issued.token.clone(),
        };

        let id = self
            .store
            .insert_user(&record)
            .await
            .map_err(|err| match err {
                CredentialStoreError::DuplicateEmail { .. } => {
                    debug!("registration rejected for an existing email");
                    Error::conflict("email already registered")
                }
                other => map_credential_store_error(other),
            })?;

        info!(user_id = %id, "account registered");
        Ok(AuthSession {
            user: User::new(id, record.email, record.display_name),
            token: issued,
        })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let record = self
            .store
            .find_by_email(credentials.email())
            .await
            .map_err(map_credential_store_error)?;

        let hasher = self.hasher.clone();
        let password = credentials.password_buffer();
        let verified = match &record {
            Some(found) => {
                let digest = found.password_hash.clone();
                run_blocking(move || hasher.verify(&password, &digest)).await?
            }
            None => run_blocking(move || hasher.verify_against_dummy(&password)).await?,
        };

        let Some(record) = record.filter(|_| verified) else {
            debug!("login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let issued = self.tokens.issue(record.user.email()).map_err(map_issue_error)?;
        self.store
            .set_token(record.user.email(), &issued.token)
            .await
            .map_err(|err| match err {
                CredentialStoreError::NotFound { .. } => {
                    Error::unauthorized(INVALID_CREDENTIALS)
                }
                other => map_credential_store_error(other),
            })?;

        info!(
            user_id = %record.user.id(),
            fingerprint = %issued.token.fingerprint(),
            "login succeeded"
        );
        Ok(AuthSession {
            user: record.user,
            token: issued,
        })
    }

    async fn logout(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.store
            .clear_token(user.email(), self.clock.utc())
            .await
            .map_err(|err| match err {
                CredentialStoreError::NotFound { .. } => Error::unauthorized(INVALID_TOKEN),
                other => map_credential_store_error(other),
            })?;
        info!(user_id = %user.id(), "logged out");
        Ok(())
    }
}
