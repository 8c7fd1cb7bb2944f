pub mod contact;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use contact::{entries_found, Contact, ContactId, CSV_COLUMNS};
pub use error::CoreError;
