//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`CredentialStore`, `UserFileRepository`) are implemented by
//! outbound adapters. Driving ports (`AccountCommand`, `TokenAuthenticator`,
//! `UserFilesCommand`, `UserFilesQuery`) are implemented by domain services
//! and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod credential_store;
mod token_authenticator;
mod user_file_repository;
mod user_files_command;
mod user_files_query;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AuthSession};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, NewUserRecord};
#[cfg(test)]
pub use token_authenticator::MockTokenAuthenticator;
pub use token_authenticator::TokenAuthenticator;
#[cfg(test)]
pub use user_file_repository::MockUserFileRepository;
pub use user_file_repository::{NewUserFile, UserFileRepository, UserFileRepositoryError};
#[cfg(test)]
pub use user_files_command::MockUserFilesCommand;
pub use user_files_command::UserFilesCommand;
#[cfg(test)]
pub use user_files_query::MockUserFilesQuery;
pub use user_files_query::UserFilesQuery;
