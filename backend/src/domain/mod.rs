//! Domain primitives, services and ports.
//!
//! Purpose: define the credential lifecycle and owner-scoped file storage
//! without any knowledge of HTTP or SQL. Inbound adapters call the driving
//! ports in [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - `Error` / `ErrorCode` and `TraceId` for transport-agnostic failures.
//! - User values (`UserId`, `EmailAddress`, `DisplayName`, `User`).
//! - Credential values (`PasswordHasher`, `TokenIssuer`, `BearerToken`).
//! - Services (`AccountService`, `AuthorizationGate`, `UserFilesService`).

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod error;
pub mod password;
pub mod ports;
pub mod token;
pub mod trace_id;
pub mod user;
pub mod user_files;
pub mod user_files_service;

pub use self::account_service::AccountService;
pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::authorization::{AuthenticatedUser, AuthorizationGate};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password::{
    DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST, PasswordDigest, PasswordHashError,
    PasswordHasher,
};
pub use self::token::{
    BearerToken, InvalidToken, IssuedToken, MissingBearer, TOKEN_TTL_HOURS, TokenIssueError,
    TokenIssuer, TokenSecret, VerifiedToken,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DisplayName, EmailAddress, User, UserId, UserRecord, UserValidationError};
pub use self::user_files::{
    DEFAULT_MAX_UPLOAD_BYTES, FileId, FileName, FilePayload, UploadLimits, UploadRequest,
    UploadValidationError, UserFile,
};
pub use self::user_files_service::UserFilesService;
