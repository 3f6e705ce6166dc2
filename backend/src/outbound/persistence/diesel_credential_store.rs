//! PostgreSQL-backed `CredentialStore` using Diesel.
//!
//! Email uniqueness is enforced by the `users_email_key` constraint; a unique
//! violation on insert is reported as a duplicate email rather than checked
//! up front.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{CredentialStore, CredentialStoreError, NewUserRecord};
use crate::domain::{
    BearerToken, DisplayName, EmailAddress, PasswordDigest, User, UserId, UserRecord,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`CredentialStore`] port.
#[derive(Clone)]
pub struct DieselCredentialStore {
    pool: DbPool,
}

impl DieselCredentialStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DieselFailure, email: Option<&EmailAddress>) -> CredentialStoreError {
    match failure {
        DieselFailure::Connection(message) => CredentialStoreError::connection(message),
        DieselFailure::UniqueViolation => CredentialStoreError::duplicate_email(
            email.map(ToString::to_string).unwrap_or_default(),
        ),
        DieselFailure::ForeignKeyViolation => {
            CredentialStoreError::query("unexpected foreign key violation")
        }
        DieselFailure::Query(message) => CredentialStoreError::query(message),
    }
}

fn map_pool_error(error: super::pool::PoolError) -> CredentialStoreError {
    CredentialStoreError::connection(pool_error_message(error))
}

fn row_to_record(row: UserRow) -> Result<UserRecord, CredentialStoreError> {
    let email = EmailAddress::new(&row.email).map_err(|err| {
        warn!(user_id = %row.id, error = %err, "stored email failed validation");
        CredentialStoreError::query(format!("invalid stored email: {err}"))
    })?;
    let display_name = DisplayName::new(&row.name).map_err(|err| {
        warn!(user_id = %row.id, error = %err, "stored name failed validation");
        CredentialStoreError::query(format!("invalid stored name: {err}"))
    })?;
    Ok(UserRecord {
        user: User::new(UserId::from_uuid(row.id), email, display_name),
        password_hash: PasswordDigest::from_stored(row.password_hash),
        current_token: row.token.and_then(BearerToken::new),
        last_logout: row.last_logout,
    })
}

fn load_record(
    result: QueryResult<UserRow>,
) -> Result<Option<UserRecord>, CredentialStoreError> {
    result
        .optional()
        .map_err(|err| map_failure(classify_diesel_error(err, "find user"), None))?
        .map(row_to_record)
        .transpose()
}

impl DieselCredentialStore {
    async fn update_token(
        &self,
        email: &EmailAddress,
        token: Option<&str>,
        logout_at: Option<DateTime<Utc>>,
    ) -> Result<(), CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = users::table.filter(users::email.eq(email.as_ref()));
        let updated = match logout_at {
            Some(at) => {
                diesel::update(target)
                    .set((users::token.eq(token), users::last_logout.eq(Some(at))))
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(target)
                    .set(users::token.eq(token))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(|err| map_failure(classify_diesel_error(err, "update token"), Some(email)))?;

        if updated == 0 {
            return Err(CredentialStoreError::not_found(email.as_ref()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for DieselCredentialStore {
    async fn insert_user(&self, record: &NewUserRecord) -> Result<UserId, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            email: record.email.as_ref(),
            password_hash: record.password_hash.as_str(),
            name: record.display_name.as_ref(),
            token: Some(record.token.as_str()),
        };

        let id = diesel::insert_into(users::table)
            .values(&row)
            .returning(users::id)
            .get_result::<Uuid>(&mut conn)
            .await
            .map_err(|err| {
                map_failure(classify_diesel_error(err, "insert user"), Some(&record.email))
            })?;

        Ok(UserId::from_uuid(id))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await;
        load_record(result)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await;
        load_record(result)
    }

    async fn set_token(
        &self,
        email: &EmailAddress,
        token: &BearerToken,
    ) -> Result<(), CredentialStoreError> {
        self.update_token(email, Some(token.as_str()), None).await
    }

    async fn clear_token(
        &self,
        email: &EmailAddress,
        logout_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        self.update_token(email, None, Some(logout_at)).await
    }
}
