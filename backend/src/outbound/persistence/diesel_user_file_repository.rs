//! PostgreSQL-backed `UserFileRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{NewUserFile, UserFileRepository, UserFileRepositoryError};
use crate::domain::{FileId, FileName, FilePayload, UserFile, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserFileRow, UserFileRow};
use super::pool::{DbPool, PoolError};
use super::schema::user_files;

/// Diesel-backed implementation of the [`UserFileRepository`] port.
#[derive(Clone)]
pub struct DieselUserFileRepository {
    pool: DbPool,
}

impl DieselUserFileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserFileRepositoryError {
    UserFileRepositoryError::connection(pool_error_message(error))
}

fn map_failure(failure: DieselFailure, owner: &UserId) -> UserFileRepositoryError {
    match failure {
        DieselFailure::Connection(message) => UserFileRepositoryError::connection(message),
        DieselFailure::ForeignKeyViolation => UserFileRepositoryError::owner_missing(owner.to_string()),
        DieselFailure::UniqueViolation => {
            UserFileRepositoryError::query("file identifier collision")
        }
        DieselFailure::Query(message) => UserFileRepositoryError::query(message),
    }
}

fn row_to_file(row: UserFileRow) -> Result<UserFile, UserFileRepositoryError> {
    let file_name = FileName::new(&row.file_name).map_err(|err| {
        warn!(file_id = %row.id, error = %err, "stored file name failed validation");
        UserFileRepositoryError::query(format!("invalid stored file name: {err}"))
    })?;
    Ok(UserFile {
        id: FileId::from_uuid(row.id),
        owner: UserId::from_uuid(row.user_id),
        file_name,
        payload: FilePayload::from_bytes(row.file_data),
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserFileRepository for DieselUserFileRepository {
    async fn insert(&self, file: &NewUserFile) -> Result<FileId, UserFileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserFileRow {
            id: Uuid::new_v4(),
            user_id: *file.owner.as_uuid(),
            file_name: file.file_name.as_ref(),
            file_data: file.payload.as_bytes(),
            created_at: file.created_at,
        };

        let id = diesel::insert_into(user_files::table)
            .values(&row)
            .returning(user_files::id)
            .get_result::<Uuid>(&mut conn)
            .await
            .map_err(|err| map_failure(classify_diesel_error(err, "insert file"), &file.owner))?;

        Ok(FileId::from_uuid(id))
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<UserFile>, UserFileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = user_files::table
            .filter(user_files::user_id.eq(owner.as_uuid()))
            .order((user_files::created_at.asc(), user_files::id.asc()))
            .select(UserFileRow::as_select())
            .load::<UserFileRow>(&mut conn)
            .await
            .map_err(|err| map_failure(classify_diesel_error(err, "list files"), owner))?;

        rows.into_iter().map(row_to_file).collect()
    }
}
