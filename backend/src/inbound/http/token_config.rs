//! Token signing secret resolution.
//!
//! The secret comes from `JWT_SECRET_KEY`, or from the file named by
//! `JWT_SECRET_FILE`. Debug builds may fall back to a random per-process
//! secret when `JWT_ALLOW_EPHEMERAL` is set; release builds never do.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::TokenSecret;

pub(crate) const SECRET_ENV: &str = "JWT_SECRET_KEY";
pub(crate) const SECRET_FILE_ENV: &str = "JWT_SECRET_FILE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "JWT_ALLOW_EPHEMERAL";
/// Minimum secret length accepted by release builds.
pub const MIN_RELEASE_SECRET_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate short and ephemeral secrets with a warning.
    Debug,
    /// Release builds require an explicit secret of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filelocker::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while resolving the signing secret.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// Neither the secret nor a secret file was configured.
    #[error("no token secret configured; set {SECRET_ENV} or {SECRET_FILE_ENV}")]
    MissingSecret,
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configured secret is too short for release builds.
    #[error("token secret from {origin} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        origin: &'static str,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral secrets.
    #[error("{ALLOW_EPHEMERAL_ENV} must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Resolve the token signing secret from the environment.
///
/// # Examples
///
/// ```rust
/// use filelocker::inbound::http::token_config::{BuildMode, token_secret_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SECRET_KEY" => Some("k".repeat(32)),
///     _ => None,
/// });
///
/// let secret = token_secret_from_env(&env, BuildMode::Release).expect("secret");
/// assert_eq!(secret.byte_len(), 32);
/// ```
pub fn token_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSecret, TokenConfigError> {
    if let Some(value) = env.string(SECRET_ENV).map(Zeroizing::new) {
        if let Some(secret) = TokenSecret::new(value.trim().as_bytes()) {
            return check_length(secret, SECRET_ENV, mode);
        }
        warn!("{SECRET_ENV} is set but blank; ignoring");
    }

    if let Some(path) = env.string(SECRET_FILE_ENV) {
        let path = PathBuf::from(path);
        let bytes = read_secret_file(&path)?;
        let trimmed = trim_trailing_newlines(&bytes);
        return match TokenSecret::new(trimmed) {
            Some(secret) => check_length(secret, SECRET_FILE_ENV, mode),
            None => Err(TokenConfigError::SecretTooShort {
                origin: SECRET_FILE_ENV,
                length: 0,
                min_len: MIN_RELEASE_SECRET_LEN,
            }),
        };
    }

    if allow_ephemeral_from_env(env, mode)? {
        warn!("using an ephemeral token secret; tokens will not survive a restart");
        return ephemeral_secret().ok_or(TokenConfigError::MissingSecret);
    }

    Err(TokenConfigError::MissingSecret)
}

fn check_length(
    secret: TokenSecret,
    origin: &'static str,
    mode: BuildMode,
) -> Result<TokenSecret, TokenConfigError> {
    let length = secret.byte_len();
    if length >= MIN_RELEASE_SECRET_LEN {
        info!(origin, "token secret loaded");
        return Ok(secret);
    }
    if mode.is_debug() {
        warn!(origin, length, "token secret shorter than release minimum");
        return Ok(secret);
    }
    Err(TokenConfigError::SecretTooShort {
        origin,
        length,
        min_len: MIN_RELEASE_SECRET_LEN,
    })
}

fn read_secret_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let read_error = |source| TokenConfigError::SecretRead {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read(Path::new(file_name))
        .map(Zeroizing::new)
        .map_err(read_error)
}

fn trim_trailing_newlines(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| !matches!(byte, b'\n' | b'\r'))
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(TokenConfigError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid {ALLOW_EPHEMERAL_ENV}; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn ephemeral_secret() -> Option<TokenSecret> {
    let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
    rand::thread_rng().fill_bytes(bytes.as_mut_slice());
    TokenSecret::new(bytes.as_slice())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
