//! HTTP server configuration object.

use std::net::SocketAddr;

use filelocker::domain::{PasswordHasher, TokenSecret, UploadLimits};
use filelocker::outbound::memory::MemoryDatabase;
use filelocker::outbound::persistence::DbPool;

/// Backing store for the driven ports.
#[derive(Clone)]
pub enum Storage {
    /// PostgreSQL through the shared pool.
    Postgres(DbPool),
    /// Process-local tables; nothing survives a restart.
    InMemory(MemoryDatabase),
}

/// Everything `create_server` needs to build the application.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) token_secret: TokenSecret,
    pub(crate) hasher: PasswordHasher,
    pub(crate) upload_limits: UploadLimits,
    pub(crate) cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Construct a configuration with default upload limits and no CORS origins.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        storage: Storage,
        token_secret: TokenSecret,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            bind_addr,
            storage,
            token_secret,
            hasher,
            upload_limits: UploadLimits::default(),
            cors_origins: Vec::new(),
        }
    }

    /// Override the upload ceiling.
    #[must_use]
    pub fn with_upload_limits(mut self, limits: UploadLimits) -> Self {
        self.upload_limits = limits;
        self
    }

    /// Allow browser requests from these origins.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "read by server tests only")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
