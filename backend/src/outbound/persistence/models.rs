//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; adapters convert them to
//! domain values before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{user_files, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub token: Option<String>,
    pub last_logout: Option<DateTime<Utc>>,
}

/// Insertable struct for creating accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub token: Option<&'a str>,
}

/// Row struct for reading from the user_files table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserFileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for storing files.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_files)]
pub(crate) struct NewUserFileRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: &'a str,
    pub file_data: &'a [u8],
    pub created_at: DateTime<Utc>,
}
