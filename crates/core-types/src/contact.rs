use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column order shared by the CSV export and the CSV import.
pub const CSV_COLUMNS: [&str; 5] = ["id", "first_name", "last_name", "email", "phone"];

/// A single entry in the address book.
///
/// The `id` is assigned by storage and travels as a string on every surface
/// (JSON, CSV). It is empty for an entry that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all contacts. Uniqueness is enforced by storage.
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn new(first_name: &str, last_name: &str, email: &str, phone: &str) -> Self {
        Self {
            id: String::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    /// Returns a copy of this contact carrying the given identifier.
    pub fn with_id(mut self, id: ContactId) -> Self {
        self.id = id.to_string();
        self
    }

    /// True when the entry carries an identifier, i.e. it refers to an existing row.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Parses the `id` field into a typed identifier.
    pub fn contact_id(&self) -> Result<ContactId, CoreError> {
        self.id.parse()
    }
}

/// A validated, integer-like contact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId(i64);

impl ContactId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for ContactId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(ContactId)
            .map_err(|_| CoreError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The message returned in place of an empty listing.
pub fn entries_found(count: usize) -> String {
    format!("{} entries found", count)
}
