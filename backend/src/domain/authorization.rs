//! Authorization gate: bearer token to authenticated account.
//!
//! A token is accepted only when its signature and expiry verify *and* it is
//! still the live token recorded for the account. Logging out or logging in
//! again replaces the stored token, which revokes every earlier one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::ports::{CredentialStore, CredentialStoreError, TokenAuthenticator};
use super::token::{BearerToken, TokenIssuer};
use super::user::{EmailAddress, UserId};
use super::Error;

/// Message returned for every rejected credential.
pub(crate) const INVALID_TOKEN: &str = "invalid token";

/// Account identity resolved from an accepted token.
///
/// Handlers receive this as an explicit parameter; it is the only way
/// downstream operations learn who the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    id: UserId,
    email: EmailAddress,
}

impl AuthenticatedUser {
    /// Build an authenticated identity.
    pub fn new(id: UserId, email: EmailAddress) -> Self {
        Self { id, email }
    }

    /// Account identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Account identity.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

pub(crate) fn map_credential_store_error(error: CredentialStoreError) -> Error {
    match &error {
        CredentialStoreError::Connection { .. } => {
            error!(%error, "credential store unavailable");
        }
        _ => error!(%error, "credential store operation failed"),
    }
    Error::internal(error.to_string())
}

/// Token authenticator consulting the credential store on every request.
pub struct AuthorizationGate<S> {
    tokens: Arc<TokenIssuer>,
    store: Arc<S>,
}

impl<S> AuthorizationGate<S> {
    /// Create a gate over the given issuer and store.
    pub fn new(tokens: Arc<TokenIssuer>, store: Arc<S>) -> Self {
        Self { tokens, store }
    }
}

#[async_trait]
impl<S> TokenAuthenticator for AuthorizationGate<S>
where
    S: CredentialStore,
{
    async fn authenticate(&self, token: &BearerToken) -> Result<AuthenticatedUser, Error> {
        let verified = self
            .tokens
            .verify(token)
            .map_err(|_| Error::unauthorized(INVALID_TOKEN))?;

        let record = self
            .store
            .find_by_email(&verified.email)
            .await
            .map_err(map_credential_store_error)?;

        let Some(record) = record else {
            debug!(fingerprint = %token.fingerprint(), "token names an unknown account");
            return Err(Error::unauthorized(INVALID_TOKEN));
        };

        let live = record
            .current_token
            .as_ref()
            .is_some_and(|stored| stored.matches(token));
        if !live {
            debug!(
                fingerprint = %token.fingerprint(),
                user_id = %record.user.id(),
                "token revoked"
            );
            return Err(Error::unauthorized(INVALID_TOKEN));
        }

        Ok(AuthenticatedUser::new(
            *record.user.id(),
            record.user.email().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for token acceptance and revocation.
    use super::*;
    use crate::domain::ports::MockCredentialStore;
    use crate::domain::{
        DisplayName, ErrorCode, PasswordDigest, TokenSecret, User, UserRecord,
    };
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct Harness {
        clock: Arc<MutableClock>,
        tokens: Arc<TokenIssuer>,
    }

    #[fixture]
    fn harness() -> Harness {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = Arc::new(MutableClock::new(start));
        let secret = TokenSecret::new(b"gate-secret".to_vec()).expect("secret");
        let tokens = Arc::new(TokenIssuer::new(&secret, clock.clone()));
        Harness { clock, tokens }
    }

    fn email() -> EmailAddress {
        EmailAddress::new("ada@example.com").expect("valid email")
    }

    fn record(current_token: Option<BearerToken>) -> UserRecord {
        UserRecord {
            user: User::new(
                UserId::random(),
                email(),
                DisplayName::new("Ada").expect("valid name"),
            ),
            password_hash: PasswordDigest::from_stored("$2b$04$unused"),
            current_token,
            last_logout: None,
        }
    }

    fn gate_returning(
        harness: &Harness,
        found: Result<Option<UserRecord>, CredentialStoreError>,
    ) -> AuthorizationGate<MockCredentialStore> {
        let mut store = MockCredentialStore::new();
        store
            .expect_find_by_email()
            .times(1)
            .return_once(move |_| found);
        AuthorizationGate::new(harness.tokens.clone(), Arc::new(store))
    }

    #[rstest]
    #[tokio::test]
    async fn live_token_is_accepted(harness: Harness) {
        let issued = harness.tokens.issue(&email()).expect("issue");
        let stored = record(Some(issued.token.clone()));
        let expected_id = *stored.user.id();
        let gate = gate_returning(&harness, Ok(Some(stored)));

        let user = gate.authenticate(&issued.token).await.expect("accepted");
        assert_eq!(user.id(), &expected_id);
        assert_eq!(user.email(), &email());
    }

    #[rstest]
    #[case::cleared(None)]
    #[case::replaced(Some("a-newer-token"))]
    #[tokio::test]
    async fn revoked_token_is_rejected(harness: Harness, #[case] stored: Option<&str>) {
        let issued = harness.tokens.issue(&email()).expect("issue");
        let stored = stored.map(|raw| BearerToken::new(raw).expect("token"));
        let gate = gate_returning(&harness, Ok(Some(record(stored))));

        let err = gate.authenticate(&issued.token).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_TOKEN);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_account_is_rejected(harness: Harness) {
        let issued = harness.tokens.issue(&email()).expect("issue");
        let gate = gate_returning(&harness, Ok(None));

        let err = gate.authenticate(&issued.token).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn expired_token_never_reaches_the_store(harness: Harness) {
        let issued = harness.tokens.issue(&email()).expect("issue");
        harness.clock.advance_seconds(25 * 3600);
        let mut store = MockCredentialStore::new();
        store.expect_find_by_email().never();
        let gate = AuthorizationGate::new(harness.tokens.clone(), Arc::new(store));

        let err = gate.authenticate(&issued.token).await.expect_err("rejected");
        assert_eq!(err.message(), INVALID_TOKEN);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failure_is_internal(harness: Harness) {
        let issued = harness.tokens.issue(&email()).expect("issue");
        let gate = gate_returning(
            &harness,
            Err(CredentialStoreError::connection("database unavailable")),
        );

        let err = gate.authenticate(&issued.token).await.expect_err("failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
