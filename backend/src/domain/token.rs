//! Signed, time-bounded bearer tokens.
//!
//! Tokens are HS256 JWTs carrying `{email, iat, exp}`. Verification
//! recomputes the signature from the process-wide secret and checks expiry
//! against the injected [`Clock`] with zero leeway: a token is valid while
//! `now < exp`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::user::EmailAddress;

/// Lifetime of an issued token, in hours.
pub const TOKEN_TTL_HOURS: i64 = 24;

const FINGERPRINT_LEN: usize = 12;

/// Signing secret shared by issuance and verification.
#[derive(Clone)]
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    /// Wrap raw secret bytes. Returns `None` for an empty secret.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        (!bytes.is_empty()).then(|| Self(Zeroizing::new(bytes)))
    }

    /// Number of secret bytes; never zero.
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret(<{} bytes>)", self.byte_len())
    }
}

/// Reason an `Authorization` header did not carry a usable bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingBearer {
    /// No header was sent.
    NoHeader,
    /// The header did not use the `Bearer` scheme.
    WrongScheme,
    /// The scheme was present but no credential followed it.
    EmptyCredential,
}

impl fmt::Display for MissingBearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHeader => write!(f, "authorization header missing"),
            Self::WrongScheme => write!(f, "authorization scheme is not Bearer"),
            Self::EmptyCredential => write!(f, "bearer credential is empty"),
        }
    }
}

impl std::error::Error for MissingBearer {}

/// Opaque bearer credential as presented by a client or stored for a user.
///
/// `Debug` never prints the token; use [`BearerToken::fingerprint`] in logs.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string. Returns `None` when blank.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        (!raw.trim().is_empty()).then_some(Self(raw))
    }

    /// Extract the credential from an `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively.
    ///
    /// # Examples
    /// ```
    /// use filelocker::domain::{BearerToken, MissingBearer};
    ///
    /// let token = BearerToken::from_authorization_header(Some("bearer abc.def.ghi")).unwrap();
    /// assert_eq!(token.as_str(), "abc.def.ghi");
    /// assert_eq!(
    ///     BearerToken::from_authorization_header(Some("Basic Zm9vOmJhcg==")).err(),
    ///     Some(MissingBearer::WrongScheme)
    /// );
    /// ```
    pub fn from_authorization_header(header: Option<&str>) -> Result<Self, MissingBearer> {
        let value = header.map(str::trim).ok_or(MissingBearer::NoHeader)?;
        if value.is_empty() {
            return Err(MissingBearer::NoHeader);
        }
        let (scheme, credential) = value
            .split_once(char::is_whitespace)
            .unwrap_or((value, ""));
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(MissingBearer::WrongScheme);
        }
        Self::new(credential.trim()).ok_or(MissingBearer::EmptyCredential)
    }

    /// Borrow the raw token for transmission or storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Compare two tokens in constant time over their SHA-256 digests.
    pub fn matches(&self, other: &Self) -> bool {
        constant_time_eq(&self.digest(), &other.digest())
    }

    /// Short hex prefix of the token digest, safe for logs.
    pub fn fingerprint(&self) -> String {
        let mut encoded = hex::encode(self.digest());
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }

    fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.0.as_bytes()).into()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({})", self.fingerprint())
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Freshly signed token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: BearerToken,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Identity recovered from a token whose signature and expiry checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Account identity bound into the token.
    pub email: EmailAddress,
    /// Expiry recorded in the token.
    pub expires_at: DateTime<Utc>,
}

/// Caller-visible verification failure. The precise cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Errors raised while signing a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token signing failed: {message}")]
pub struct TokenIssueError {
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    email: String,
    iat: i64,
    exp: i64,
    /// Keeps two tokens issued within the same second distinct.
    jti: String,
}

/// Issues and verifies bearer tokens with a single immutable secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Build an issuer using a [`TOKEN_TTL_HOURS`] lifetime.
    pub fn new(secret: &TokenSecret, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(secret, clock, TimeDelta::hours(TOKEN_TTL_HOURS))
    }

    /// Build an issuer with a custom token lifetime.
    pub fn with_ttl(secret: &TokenSecret, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock rather than the OS clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    /// Sign a token for `email` valid from now until now + TTL.
    pub fn issue(&self, email: &EmailAddress) -> Result<IssuedToken, TokenIssueError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let claims = TokenClaims {
            email: email.as_ref().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
        };
        let raw = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenIssueError {
                message: err.to_string(),
            })?;
        let token = BearerToken::new(raw).ok_or_else(|| TokenIssueError {
            message: "encoder produced an empty token".to_owned(),
        })?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, algorithm and expiry, returning the bound identity.
    pub fn verify(&self, token: &BearerToken) -> Result<VerifiedToken, InvalidToken> {
        let data = jsonwebtoken::decode::<TokenClaims>(token.as_str(), &self.decoding, &self.validation)
            .map_err(|err| {
                let reason = match err.kind() {
                    ErrorKind::InvalidSignature => "bad signature",
                    ErrorKind::InvalidAlgorithm => "algorithm mismatch",
                    ErrorKind::ExpiredSignature => "expired",
                    _ => "malformed",
                };
                debug!(reason, fingerprint = %token.fingerprint(), "token rejected");
                InvalidToken
            })?;
        let claims = data.claims;

        let now = self.clock.utc().timestamp();
        if now >= claims.exp {
            debug!(reason = "expired", fingerprint = %token.fingerprint(), "token rejected");
            return Err(InvalidToken);
        }

        let email = EmailAddress::new(&claims.email).map_err(|_| {
            debug!(reason = "malformed", fingerprint = %token.fingerprint(), "token rejected");
            InvalidToken
        })?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or_else(|| {
            debug!(reason = "malformed", fingerprint = %token.fingerprint(), "token rejected");
            InvalidToken
        })?;

        Ok(VerifiedToken { email, expires_at })
    }
}
