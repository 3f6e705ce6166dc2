//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, CredentialStore, TokenAuthenticator, UserFileRepository, UserFilesCommand,
    UserFilesQuery,
};
use crate::domain::{
    AccountService, AuthorizationGate, PasswordHasher, TokenIssuer, UploadLimits, UserFilesService,
};

/// Collaborators shared by every domain service.
#[derive(Clone)]
pub struct ServiceDeps {
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenIssuer>,
    pub clock: Arc<dyn Clock>,
}

/// Port implementations needed by the HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub files: Arc<dyn UserFilesCommand>,
    pub files_query: Arc<dyn UserFilesQuery>,
}

impl HttpStatePorts {
    /// Wire the domain services over a pair of driven adapters.
    pub fn from_adapters<S, F>(store: Arc<S>, files: Arc<F>, deps: ServiceDeps) -> Self
    where
        S: CredentialStore + 'static,
        F: UserFileRepository + 'static,
    {
        let ServiceDeps {
            hasher,
            tokens,
            clock,
        } = deps;
        let accounts = AccountService::new(store.clone(), hasher, tokens.clone(), clock.clone());
        let authenticator = AuthorizationGate::new(tokens, store.clone());
        let file_service = Arc::new(UserFilesService::new(store, files, clock));
        Self {
            accounts: Arc::new(accounts),
            authenticator: Arc::new(authenticator),
            files: file_service.clone(),
            files_query: file_service,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub files: Arc<dyn UserFilesCommand>,
    pub files_query: Arc<dyn UserFilesQuery>,
    pub upload_limits: UploadLimits,
}

impl HttpState {
    /// Bundle ports with the upload ceiling enforced before decoding.
    pub fn new(ports: HttpStatePorts, upload_limits: UploadLimits) -> Self {
        let HttpStatePorts {
            accounts,
            authenticator,
            files,
            files_query,
        } = ports;
        Self {
            accounts,
            authenticator,
            files,
            files_query,
            upload_limits,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, UploadLimits::default())
    }
}
