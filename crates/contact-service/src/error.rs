use core_types::CoreError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid id provided: {0:?}")]
    InvalidIdentifier(String),

    #[error("an id is required to update a contact")]
    MissingIdentifier,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid CSV: {0}")]
    InvalidCsv(#[from] csv::Error),

    #[error("invalid CSV header: missing column {0:?}")]
    MissingColumn(&'static str),

    #[error(transparent)]
    Storage(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("no contact with id {0}")]
    Vanished(String),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidIdentifier(raw) => ServiceError::InvalidIdentifier(raw),
        }
    }
}

impl ServiceError {
    pub fn is_duplicate_email(&self) -> bool {
        matches!(self, ServiceError::Storage(err) if err.is_duplicate_email())
    }

    /// True for failures caused by the caller's input rather than by storage or I/O.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::InvalidIdentifier(_)
            | ServiceError::MissingIdentifier
            | ServiceError::MissingField(_)
            | ServiceError::MissingColumn(_) => true,
            // A read failure underneath the CSV reader is ours, not the caller's.
            ServiceError::InvalidCsv(err) => !err.is_io_error(),
            _ => false,
        }
    }
}
