//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` carries a unique constraint; `token` holds the single live
    /// bearer token and is `NULL` after logout.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Text,
        name -> Varchar,
        token -> Nullable<Text>,
        last_logout -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Files uploaded by an account; deleted with their owner.
    user_files (id) {
        id -> Uuid,
        user_id -> Uuid,
        file_name -> Varchar,
        file_data -> Bytea,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(user_files -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, user_files);
