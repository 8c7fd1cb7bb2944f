//! Business operations over contacts: single-entry CRUD plus bulk CSV
//! export and import. The service is stateless; every call is one unit of work
//! against the injected `ContactStore`.

use core_types::{entries_found, Contact, ContactId};
use database::{ContactStore, ExecAck};
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;

pub mod csv_codec;
pub mod error;
pub mod export;
pub mod import;

pub use error::ServiceError;
pub use export::CsvExport;
pub use import::{ImportAborted, ImportOutcome, ImportStatus};

/// The answer to a read: either the matching entries or, when nothing
/// matched, the count message (`"0 entries found"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Entries(Vec<Contact>),
    Count(String),
}

impl Listing {
    fn from_entries(entries: Vec<Contact>) -> Self {
        if entries.is_empty() {
            Listing::Count(entries_found(0))
        } else {
            Listing::Entries(entries)
        }
    }

    /// The entries, or an empty slice for the count message.
    pub fn entries(&self) -> &[Contact] {
        match self {
            Listing::Entries(entries) => entries,
            Listing::Count(_) => &[],
        }
    }
}

/// Orchestrates contact operations on top of a `ContactStore`.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Persists a new contact and returns it as stored, with its assigned id.
    pub async fn create(&self, input: Contact) -> Result<Contact, ServiceError> {
        require_email(&input)?;
        let id = self.store.insert(&input).await?;
        tracing::debug!(%id, "Contact created.");
        self.refetch(id).await
    }

    pub async fn read_all(&self) -> Result<Listing, ServiceError> {
        let entries = self.store.fetch_all().await?;
        Ok(Listing::from_entries(entries))
    }

    /// Reads one contact. `raw_id` must be integer-like; anything else fails
    /// before storage is touched.
    pub async fn read_by_id(&self, raw_id: &str) -> Result<Listing, ServiceError> {
        let id: ContactId = raw_id.parse()?;
        let entry = self.store.fetch_by_id(id).await?;
        Ok(Listing::from_entries(entry.into_iter().collect()))
    }

    /// Overwrites every field of an existing contact and returns the stored row.
    pub async fn update(&self, input: Contact) -> Result<Contact, ServiceError> {
        if !input.has_id() {
            return Err(ServiceError::MissingIdentifier);
        }
        let id = input.contact_id()?;
        require_email(&input)?;
        let ack = self.store.update(id, &input).await?;
        tracing::debug!(%id, rows_affected = ack.rows_affected, "Contact updated.");
        self.refetch(id).await
    }

    /// Deletes by identifier. Deleting an unknown id is acknowledged with zero rows.
    pub async fn delete(&self, raw_id: &str) -> Result<ExecAck, ServiceError> {
        let id: ContactId = raw_id.parse()?;
        let ack = self.store.delete(id).await?;
        tracing::debug!(%id, rows_affected = ack.rows_affected, "Contact deleted.");
        Ok(ack)
    }

    /// Spools every contact into a temporary CSV file.
    pub async fn export(&self) -> Result<CsvExport, ServiceError> {
        let contacts = self.store.fetch_all().await?;
        let export = tokio::task::spawn_blocking(move || CsvExport::write(&contacts)).await??;
        tracing::info!(rows = export.rows(), "Contacts exported.");
        Ok(export)
    }

    /// Reconciles a CSV document against storage.
    ///
    /// Rows with an `id` update that contact; rows without one are inserted.
    /// A row whose email collides with another contact is set aside and the
    /// batch continues. Any other failure stops the batch immediately; rows
    /// already written stay written.
    pub async fn import<R>(&self, source: R) -> Result<ImportOutcome, ImportAborted>
    where
        R: Read + Send + 'static,
    {
        let rows = tokio::task::spawn_blocking(move || csv_codec::read_contacts(source))
            .await
            .map_err(|e| ImportAborted::before_any_row(e.into()))?
            .map_err(ImportAborted::before_any_row)?;

        let mut outcome = ImportOutcome::default();
        for row in rows {
            match self.import_row(&row).await {
                Ok(()) => outcome.accepted += 1,
                Err(err) if err.is_duplicate_email() => {
                    tracing::debug!(email = %row.email, "Skipping row with duplicate email.");
                    outcome.reject(row, &err);
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        accepted = outcome.accepted,
                        rejected = outcome.rejected.len(),
                        "Import aborted."
                    );
                    return Err(ImportAborted {
                        error: err,
                        accepted: outcome.accepted,
                        rejected: outcome.rejected,
                    });
                }
            }
        }

        tracing::info!(
            accepted = outcome.accepted,
            rejected = outcome.rejected.len(),
            "Import finished."
        );
        Ok(outcome)
    }

    pub async fn health_check(&self) -> Result<(), ServiceError> {
        self.store.health_check().await?;
        Ok(())
    }

    async fn import_row(&self, row: &Contact) -> Result<(), ServiceError> {
        if row.has_id() {
            let id = row.contact_id()?;
            self.store.update(id, row).await?;
        } else {
            self.store.insert(row).await?;
        }
        Ok(())
    }

    async fn refetch(&self, id: ContactId) -> Result<Contact, ServiceError> {
        self.store
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::Vanished(id.to_string()))
    }
}

fn require_email(contact: &Contact) -> Result<(), ServiceError> {
    if contact.email.trim().is_empty() {
        return Err(ServiceError::MissingField("email"));
    }
    Ok(())
}
