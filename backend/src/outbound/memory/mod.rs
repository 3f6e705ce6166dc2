//! In-memory adapters for tests and database-less development runs.
//!
//! Both adapters share one [`MemoryDatabase`] so the file repository can
//! enforce the owner foreign key the way PostgreSQL does.

mod credential_store;
mod user_file_repository;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use credential_store::MemoryCredentialStore;
pub use user_file_repository::MemoryUserFileRepository;

#[derive(Debug, Clone)]
struct StoredUser {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    token: Option<String>,
    last_logout: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    id: Uuid,
    user_id: Uuid,
    file_name: String,
    file_data: Vec<u8>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, StoredUser>,
    files: Vec<StoredFile>,
}

/// Shared in-process tables backing the memory adapters.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credential store view over this database.
    pub fn credential_store(&self) -> MemoryCredentialStore {
        MemoryCredentialStore::new(self.clone())
    }

    /// File repository view over this database.
    pub fn user_file_repository(&self) -> MemoryUserFileRepository {
        MemoryUserFileRepository::new(self.clone())
    }

    /// Remove an account and, like `ON DELETE CASCADE`, its files.
    pub fn delete_user(&self, id: &crate::domain::UserId) -> bool {
        let mut tables = self.lock();
        let removed = tables.users.remove(id.as_uuid()).is_some();
        tables.files.retain(|file| file.user_id != *id.as_uuid());
        removed
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.tables.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
