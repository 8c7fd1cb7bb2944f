use thiserror::Error;

/// How a storage failure is classified for callers that must react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The unique constraint on `email` rejected the write.
    DuplicateEmail,
    /// The database could not be reached or the pool gave up.
    Unavailable,
    Unknown,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to configure the database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Invalid schema definition: {0}")]
    InvalidSchema(String),

    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("Database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Unknown(#[source] sqlx::Error),
}

impl DbError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            DbError::DuplicateEmail(_) => StorageErrorKind::DuplicateEmail,
            DbError::ConnectionConfigError(_) | DbError::Unavailable(_) => {
                StorageErrorKind::Unavailable
            }
            DbError::InvalidSchema(_) | DbError::Unknown(_) => StorageErrorKind::Unknown,
        }
    }

    pub fn is_duplicate_email(&self) -> bool {
        self.kind() == StorageErrorKind::DuplicateEmail
    }
}

/// Classifies driver errors by their structure, never by message text.
///
/// A unique violation counts as a duplicate email when the violated constraint
/// names the email column, or when the driver does not report a constraint
/// (the email index is the only unique constraint besides the primary key,
/// which storage assigns itself).
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let on_email = db_err
                    .constraint()
                    .map_or(true, |name| name.to_ascii_lowercase().contains("email"));
                if on_email {
                    DbError::DuplicateEmail(db_err.message().to_string())
                } else {
                    DbError::Unknown(sqlx::Error::Database(db_err))
                }
            }
            err @ (sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::WorkerCrashed) => DbError::Unavailable(err),
            err => DbError::Unknown(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    /// A driver error double carrying just what classification inspects.
    #[derive(Debug)]
    struct FakeDbError {
        kind: ErrorKind,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn driver_error(kind: ErrorKind, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { kind, constraint }))
    }

    #[test]
    fn email_unique_violation_is_a_duplicate_email() {
        let err = DbError::from(driver_error(ErrorKind::UniqueViolation, Some("entries_email_key")));
        assert_eq!(err.kind(), StorageErrorKind::DuplicateEmail);
        assert!(err.is_duplicate_email());
    }

    #[test]
    fn unique_violation_without_constraint_name_is_a_duplicate_email() {
        let err = DbError::from(driver_error(ErrorKind::UniqueViolation, None));
        assert!(err.is_duplicate_email());
    }

    #[test]
    fn unique_violation_on_another_constraint_is_unknown() {
        let err = DbError::from(driver_error(ErrorKind::UniqueViolation, Some("entries_pkey")));
        assert_eq!(err.kind(), StorageErrorKind::Unknown);
    }

    #[test]
    fn other_constraint_violations_are_unknown() {
        let err = DbError::from(driver_error(ErrorKind::NotNullViolation, Some("entries_email_key")));
        assert_eq!(err.kind(), StorageErrorKind::Unknown);
    }

    #[test]
    fn pool_and_transport_failures_are_unavailable() {
        assert_eq!(DbError::from(sqlx::Error::PoolTimedOut).kind(), StorageErrorKind::Unavailable);
        assert_eq!(DbError::from(sqlx::Error::PoolClosed).kind(), StorageErrorKind::Unavailable);
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(DbError::from(sqlx::Error::Io(io)).kind(), StorageErrorKind::Unavailable);
    }

    #[test]
    fn row_not_found_is_unknown() {
        assert_eq!(DbError::from(sqlx::Error::RowNotFound).kind(), StorageErrorKind::Unknown);
    }
}
