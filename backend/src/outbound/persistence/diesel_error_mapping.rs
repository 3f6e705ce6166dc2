//! Shared Diesel error classification for the repository adapters.
//!
//! Adapters translate a [`DieselFailure`] into their own port error so the
//! domain never sees Diesel types.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse outcome of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be obtained.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation,
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation,
    /// Any other query failure.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the database message at debug level.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &'static str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(error = %error, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DieselFailure::UniqueViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DieselFailure::ForeignKeyViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        _ => DieselFailure::Query(format!("database error during {operation}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct StubInfo(&'static str);

    impl diesel::result::DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(StubInfo("stub")))
    }

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, DieselFailure::UniqueViolation)]
    #[case(DatabaseErrorKind::ForeignKeyViolation, DieselFailure::ForeignKeyViolation)]
    #[case(
        DatabaseErrorKind::ClosedConnection,
        DieselFailure::Connection("database connection error".to_owned())
    )]
    fn database_errors_are_classified(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: DieselFailure,
    ) {
        assert_eq!(classify_diesel_error(database_error(kind), "insert user"), expected);
    }

    #[rstest]
    fn other_errors_are_query_failures() {
        assert_eq!(
            classify_diesel_error(DieselError::RollbackTransaction, "list files"),
            DieselFailure::Query("database error during list files".to_owned())
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(
            pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }
}
