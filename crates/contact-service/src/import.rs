use crate::error::ServiceError;
use core_types::Contact;
use thiserror::Error;

/// Overall status of a bulk import that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Every row was persisted.
    Accepted,
    /// At least one row collided with an existing email and was skipped.
    DuplicateEmail,
}

/// Result of a bulk import that was not aborted.
///
/// Rows absent from `rejected` were accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Rows inserted or updated.
    pub accepted: usize,
    /// Rows skipped because their email already belongs to another contact.
    pub rejected: Vec<Contact>,
    /// Storage's message for the first conflict, if any.
    pub conflict: Option<String>,
}

impl ImportOutcome {
    pub fn status(&self) -> ImportStatus {
        if self.rejected.is_empty() {
            ImportStatus::Accepted
        } else {
            ImportStatus::DuplicateEmail
        }
    }

    pub fn is_clean(&self) -> bool {
        self.status() == ImportStatus::Accepted
    }

    pub(crate) fn reject(&mut self, contact: Contact, err: &ServiceError) {
        if self.conflict.is_none() {
            self.conflict = Some(err.to_string());
        }
        self.rejected.push(contact);
    }
}

/// A bulk import stopped by a failure other than a duplicate email.
///
/// Rows processed before the failure stay persisted; `rejected` holds the
/// conflicts collected up to that point.
#[derive(Error, Debug)]
#[error("import aborted: {error}")]
pub struct ImportAborted {
    #[source]
    pub error: ServiceError,
    pub accepted: usize,
    pub rejected: Vec<Contact>,
}

impl ImportAborted {
    pub(crate) fn before_any_row(error: ServiceError) -> Self {
        Self { error, accepted: 0, rejected: Vec::new() }
    }
}
