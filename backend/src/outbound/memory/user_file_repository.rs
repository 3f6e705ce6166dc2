//! In-memory `UserFileRepository`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{NewUserFile, UserFileRepository, UserFileRepositoryError};
use crate::domain::{FileId, FileName, FilePayload, UserFile, UserId};

use super::{MemoryDatabase, StoredFile};

/// File repository holding payloads in process memory.
#[derive(Debug, Clone)]
pub struct MemoryUserFileRepository {
    db: MemoryDatabase,
}

impl MemoryUserFileRepository {
    pub(super) fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

fn to_user_file(stored: &StoredFile) -> Result<UserFile, UserFileRepositoryError> {
    let file_name = FileName::new(&stored.file_name)
        .map_err(|err| UserFileRepositoryError::query(format!("invalid stored file name: {err}")))?;
    Ok(UserFile {
        id: FileId::from_uuid(stored.id),
        owner: UserId::from_uuid(stored.user_id),
        file_name,
        payload: FilePayload::from_bytes(stored.file_data.clone()),
        created_at: stored.created_at,
    })
}

#[async_trait]
impl UserFileRepository for MemoryUserFileRepository {
    async fn insert(&self, file: &NewUserFile) -> Result<FileId, UserFileRepositoryError> {
        let mut tables = self.db.lock();
        if !tables.users.contains_key(file.owner.as_uuid()) {
            return Err(UserFileRepositoryError::owner_missing(file.owner.to_string()));
        }
        let id = Uuid::new_v4();
        tables.files.push(StoredFile {
            id,
            user_id: *file.owner.as_uuid(),
            file_name: file.file_name.as_ref().to_owned(),
            file_data: file.payload.as_bytes().to_vec(),
            created_at: file.created_at,
        });
        Ok(FileId::from_uuid(id))
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<UserFile>, UserFileRepositoryError> {
        let tables = self.db.lock();
        let mut owned = tables
            .files
            .iter()
            .filter(|file| file.user_id == *owner.as_uuid())
            .map(to_user_file)
            .collect::<Result<Vec<_>, _>>()?;
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }
}
