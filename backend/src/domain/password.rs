//! Salted one-way password hashing backed by bcrypt.
//!
//! Hashing is CPU-bound by construction. Services call into
//! [`PasswordHasher`] from `tokio::task::spawn_blocking` so async workers stay
//! responsive.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::warn;

/// Production bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 14;
/// Lowest work factor bcrypt accepts; used by tests.
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Errors raised while producing a password digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// The requested work factor is outside what bcrypt supports.
    #[error("bcrypt cost {cost} outside supported range {min}..={max}")]
    UnsupportedCost { cost: u32, min: u32, max: u32 },
    /// The underlying hash computation failed.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

/// Self-describing bcrypt digest (algorithm, cost and salt are embedded).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest read back from storage.
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Borrow the encoded digest for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// bcrypt hasher with a fixed work factor.
///
/// Cloning is cheap; clones share the lazily computed dummy digest used to
/// equalise timing for unknown accounts.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy: Arc<OnceLock<Option<PasswordDigest>>>,
}

impl PasswordHasher {
    /// Create a hasher for the given bcrypt cost.
    ///
    /// # Examples
    /// ```
    /// use filelocker::domain::PasswordHasher;
    ///
    /// let hasher = PasswordHasher::new(4).unwrap();
    /// let digest = hasher.hash("correct horse").unwrap();
    /// assert!(hasher.verify("correct horse", &digest));
    /// assert!(!hasher.verify("battery staple", &digest));
    /// ```
    pub fn new(cost: u32) -> Result<Self, PasswordHashError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(PasswordHashError::UnsupportedCost {
                cost,
                min: MIN_BCRYPT_COST,
                max: MAX_BCRYPT_COST,
            });
        }
        Ok(Self {
            cost,
            dummy: Arc::new(OnceLock::new()),
        })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError> {
        bcrypt::hash(plaintext, self.cost)
            .map(PasswordDigest)
            .map_err(|err| PasswordHashError::Hashing {
                message: err.to_string(),
            })
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// A digest that cannot be parsed verifies as `false`; the cause is
    /// logged but never returned.
    pub fn verify(&self, plaintext: &str, digest: &PasswordDigest) -> bool {
        match bcrypt::verify(plaintext, digest.as_str()) {
            Ok(matches) => matches,
            Err(error) => {
                warn!(%error, "stored password digest could not be verified");
                false
            }
        }
    }

    /// Spend the same effort as [`PasswordHasher::verify`] for an identity
    /// that does not exist. Always returns `false`.
    pub fn verify_against_dummy(&self, plaintext: &str) -> bool {
        let dummy = self.dummy.get_or_init(|| match self.hash("filelocker-dummy") {
            Ok(digest) => Some(digest),
            Err(error) => {
                warn!(%error, "failed to prepare dummy password digest");
                None
            }
        });
        if let Some(digest) = dummy {
            let _ = self.verify(plaintext, digest);
        }
        false
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for bcrypt hashing.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_BCRYPT_COST).expect("minimum cost is supported")
    }

    #[rstest]
    fn digests_are_salted(hasher: PasswordHasher) {
        let first = hasher.hash("hunter2").expect("hash");
        let second = hasher.hash("hunter2").expect("hash");

        assert_ne!(first, second);
        assert!(hasher.verify("hunter2", &first));
        assert!(hasher.verify("hunter2", &second));
    }

    #[rstest]
    fn digest_embeds_cost(hasher: PasswordHasher) {
        let digest = hasher.hash("hunter2").expect("hash");
        assert!(digest.as_str().starts_with("$2b$04$"));
    }

    #[rstest]
    fn wrong_password_does_not_verify(hasher: PasswordHasher) {
        let digest = hasher.hash("hunter2").expect("hash");
        assert!(!hasher.verify("hunter3", &digest));
    }

    #[rstest]
    fn malformed_digest_verifies_false(hasher: PasswordHasher) {
        let digest = PasswordDigest::from_stored("not-a-bcrypt-digest");
        assert!(!hasher.verify("hunter2", &digest));
    }

    #[rstest]
    fn dummy_verification_always_fails(hasher: PasswordHasher) {
        assert!(!hasher.verify_against_dummy("filelocker-dummy"));
        assert!(!hasher.verify_against_dummy("anything"));
    }

    #[rstest]
    #[case(3)]
    #[case(32)]
    fn unsupported_costs_are_rejected(#[case] cost: u32) {
        assert!(matches!(
            PasswordHasher::new(cost),
            Err(PasswordHashError::UnsupportedCost { .. })
        ));
    }

    #[rstest]
    fn debug_output_redacts_digest(hasher: PasswordHasher) {
        let digest = hasher.hash("hunter2").expect("hash");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(<redacted>)");
    }
}
