use crate::{error::{AppError, ConflictBody}, AppState};
use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Query,
        State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contact_service::{CsvExport, Listing, ServiceError};
use futures_util::stream;
use core_types::Contact;
use database::ExecAck;
use serde::Deserialize;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const CSV_CONTENT_DISPOSITION: &str = "attachment; filename=contacts.csv";
const EXPORT_CHUNK_BYTES: usize = 8 * 1024;
/// Name of the multipart field carrying the CSV upload.
pub const IMPORT_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub id: Option<String>,
}

impl EntryQuery {
    /// The `id` parameter, treating `?id=` like an absent parameter.
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// # POST /api/entry
/// Creates a contact and answers with the stored row, including its new id.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Result<Json<Contact>, AppError> {
    let Json(contact) = payload?;
    let created = state
        .service
        .create(contact.clone())
        .await
        .map_err(|e| AppError::from_write(e, contact))?;
    Ok(Json(created))
}

/// # GET /api/entry
/// # GET /api/entry?id=<int>
pub async fn get_entries(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EntryQuery>, QueryRejection>,
) -> Result<Json<Listing>, AppError> {
    let Query(query) = query?;
    let listing = match query.id() {
        Some(id) => state.service.read_by_id(id).await?,
        None => state.service.read_all().await?,
    };
    Ok(Json(listing))
}

/// # PUT /api/entry
/// Overwrites every field of the contact named by the body's `id`.
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Result<Json<Contact>, AppError> {
    let Json(contact) = payload?;
    let updated = state
        .service
        .update(contact.clone())
        .await
        .map_err(|e| AppError::from_write(e, contact))?;
    Ok(Json(updated))
}

/// # DELETE /api/entry?id=<int>
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EntryQuery>, QueryRejection>,
) -> Result<Json<ExecAck>, AppError> {
    let Query(query) = query?;
    // A missing id goes through the same validation as a malformed one.
    let ack = state.service.delete(query.id().unwrap_or_default()).await?;
    Ok(Json(ack))
}

/// # GET /api/entry/export
/// Streams every contact back as a CSV attachment.
pub async fn export_entries(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let export = state.service.export().await?;
    let body = export_body(export)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_CONTENT_DISPOSITION),
        ],
        body,
    )
        .into_response())
}

/// Turns a spooled export into a response body read in fixed-size chunks.
///
/// The export travels with the stream so its temporary file outlives every
/// read and is deleted once the body is finished or dropped.
fn export_body(export: CsvExport) -> std::io::Result<Body> {
    let file = tokio::fs::File::from_std(export.reopen()?);
    let chunks = stream::try_unfold((file, export), |(file, export)| next_chunk(file, export));
    Ok(Body::from_stream(chunks))
}

async fn next_chunk(
    mut file: tokio::fs::File,
    export: CsvExport,
) -> std::io::Result<Option<(Bytes, (tokio::fs::File, CsvExport))>> {
    let mut chunk = vec![0; EXPORT_CHUNK_BYTES];
    let read = file.read(&mut chunk).await?;
    if read == 0 {
        tracing::debug!(rows = export.rows(), "Export stream finished.");
        return Ok(None);
    }
    chunk.truncate(read);
    Ok(Some((Bytes::from(chunk), (file, export))))
}

/// # POST /api/entry/import
/// Accepts a multipart upload whose `file` field is a `text/csv` document.
///
/// Answers 202 with no body when every row was persisted, or 200 with the
/// rows refused for duplicate emails. A batch stopped by any other failure
/// answers with that failure's status and the rows refused before it.
pub async fn import_entries(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMPORT_FIELD) {
            continue;
        }
        if field.content_type() != Some(CSV_CONTENT_TYPE) {
            return Err(AppError::InvalidFileType);
        }
        upload = Some(field.bytes().await?);
        break;
    }
    let data = upload.ok_or(AppError::MissingFile)?;

    // The spooled copy is removed when `spool` drops, on every path out of here.
    let spool = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new().prefix("import.").suffix(".csv").tempfile()?;
        file.write_all(&data)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(ServiceError::from)??;
    let reader = spool.reopen()?;

    match state.service.import(reader).await {
        Ok(outcome) if outcome.is_clean() => Ok(StatusCode::ACCEPTED.into_response()),
        Ok(outcome) => {
            let body = ConflictBody {
                error: outcome
                    .conflict
                    .unwrap_or_else(|| "duplicate email".to_string()),
                invalid_entries: outcome.rejected,
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(aborted) => {
            let rejected_emails: Vec<&str> =
                aborted.rejected.iter().map(|c| c.email.as_str()).collect();
            tracing::warn!(
                accepted = aborted.accepted,
                rejected = ?rejected_emails,
                "Import stopped before the end of the file."
            );
            Err(AppError::ImportAborted { error: aborted.error, rejected: aborted.rejected })
        }
    }
}

/// # GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<&'static str, AppError> {
    state.service.health_check().await?;
    Ok("OK")
}

/// Answers every request no route claims.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use contact_service::ContactService;
    use database::MemoryContactStore;

    #[tokio::test]
    async fn export_body_streams_the_file_and_then_deletes_it() {
        let service = ContactService::new(Arc::new(MemoryContactStore::new()));
        let contact = Contact {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            ..Contact::default()
        };
        service.create(contact).await.unwrap();

        let export = service.export().await.unwrap();
        let path = export.path().to_path_buf();
        let body = export_body(export).unwrap();
        assert!(path.exists());

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("id,first_name,last_name,email,phone\n"));
        assert!(text.contains("Ada,,ada@example.com"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropped_export_body_deletes_the_file() {
        let service = ContactService::new(Arc::new(MemoryContactStore::new()));
        let export = service.export().await.unwrap();
        let path = export.path().to_path_buf();

        drop(export_body(export).unwrap());
        assert!(!path.exists());
    }
}
