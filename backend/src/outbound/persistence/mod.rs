//! PostgreSQL persistence adapters using Diesel.
//!
//! Repository implementations only translate between Diesel rows and domain
//! values. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module.
//!
//! ```ignore
//! use filelocker::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/filelocker")).await?;
//! let store = DieselCredentialStore::new(pool);
//! ```

mod diesel_credential_store;
mod diesel_error_mapping;
mod diesel_user_file_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_credential_store::DieselCredentialStore;
pub use diesel_user_file_repository::DieselUserFileRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
