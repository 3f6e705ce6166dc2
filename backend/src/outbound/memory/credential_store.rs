//! In-memory `CredentialStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{CredentialStore, CredentialStoreError, NewUserRecord};
use crate::domain::{
    BearerToken, DisplayName, EmailAddress, PasswordDigest, User, UserId, UserRecord,
};

use super::{MemoryDatabase, StoredUser};

/// Credential store holding accounts in process memory.
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    db: MemoryDatabase,
}

impl MemoryCredentialStore {
    pub(super) fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

fn to_record(stored: &StoredUser) -> Result<UserRecord, CredentialStoreError> {
    let email = EmailAddress::new(&stored.email)
        .map_err(|err| CredentialStoreError::query(format!("invalid stored email: {err}")))?;
    let display_name = DisplayName::new(&stored.name)
        .map_err(|err| CredentialStoreError::query(format!("invalid stored name: {err}")))?;
    Ok(UserRecord {
        user: User::new(UserId::from_uuid(stored.id), email, display_name),
        password_hash: PasswordDigest::from_stored(stored.password_hash.clone()),
        current_token: stored.token.clone().and_then(BearerToken::new),
        last_logout: stored.last_logout,
    })
}

impl MemoryCredentialStore {
    fn update_by_email<F>(&self, email: &EmailAddress, apply: F) -> Result<(), CredentialStoreError>
    where
        F: FnOnce(&mut StoredUser),
    {
        let mut tables = self.db.lock();
        let stored = tables
            .users
            .values_mut()
            .find(|user| user.email == email.as_ref())
            .ok_or_else(|| CredentialStoreError::not_found(email.as_ref()))?;
        apply(stored);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert_user(&self, record: &NewUserRecord) -> Result<UserId, CredentialStoreError> {
        let mut tables = self.db.lock();
        if tables
            .users
            .values()
            .any(|user| user.email == record.email.as_ref())
        {
            return Err(CredentialStoreError::duplicate_email(record.email.as_ref()));
        }
        let id = Uuid::new_v4();
        tables.users.insert(
            id,
            StoredUser {
                id,
                email: record.email.as_ref().to_owned(),
                password_hash: record.password_hash.as_str().to_owned(),
                name: record.display_name.as_ref().to_owned(),
                token: Some(record.token.as_str().to_owned()),
                last_logout: None,
            },
        );
        Ok(UserId::from_uuid(id))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, CredentialStoreError> {
        let tables = self.db.lock();
        tables
            .users
            .values()
            .find(|user| user.email == email.as_ref())
            .map(to_record)
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, CredentialStoreError> {
        let tables = self.db.lock();
        tables.users.get(id.as_uuid()).map(to_record).transpose()
    }

    async fn set_token(
        &self,
        email: &EmailAddress,
        token: &BearerToken,
    ) -> Result<(), CredentialStoreError> {
        let raw = token.as_str().to_owned();
        self.update_by_email(email, |user| user.token = Some(raw))
    }

    async fn clear_token(
        &self,
        email: &EmailAddress,
        logout_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        self.update_by_email(email, |user| {
            user.token = None;
            user.last_logout = Some(logout_at);
        })
    }
}
