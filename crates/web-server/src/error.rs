use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contact_service::ServiceError;
use core_types::Contact;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Body returned when rows were refused because their email is taken.
#[derive(Debug, Serialize)]
pub struct ConflictBody {
    pub error: String,
    #[serde(rename = "invalidEntries")]
    pub invalid_entries: Vec<Contact>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("invalid file type")]
    InvalidFileType,
    #[error("missing multipart field \"file\"")]
    MissingFile,
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("{message}")]
    Conflict { message: String, entries: Vec<Contact> },
    /// A bulk import stopped early; `rejected` are the conflicts collected before it stopped.
    #[error("{error}")]
    ImportAborted { error: ServiceError, rejected: Vec<Contact> },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Maps a failed single-row write, turning an email conflict into a
    /// structured response that names the submitted contact.
    pub fn from_write(err: ServiceError, submitted: Contact) -> Self {
        if err.is_duplicate_email() {
            AppError::Conflict { message: err.to_string(), entries: vec![submitted] }
        } else {
            AppError::Service(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Service(err) | AppError::ImportAborted { error: err, .. } => {
                service_status(err)
            }
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidFileType | AppError::MissingFile | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Vanished(_) => StatusCode::NOT_FOUND,
        err if err.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed.");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected.");
        }

        match self {
            AppError::Conflict { message, entries } => {
                let body = ConflictBody { error: message, invalid_entries: entries };
                (status, Json(body)).into_response()
            }
            AppError::ImportAborted { error, rejected } => {
                let body = ConflictBody { error: error.to_string(), invalid_entries: rejected };
                (status, Json(body)).into_response()
            }
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (status, body).into_response()
            }
        }
    }
}
