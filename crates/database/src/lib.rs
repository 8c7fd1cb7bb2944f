//! # Contacts Database Crate
//!
//! This crate is the persistence gateway for contacts. It owns the SQL text,
//! the connection pool and the mapping between rows and `Contact` values.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** all database-specific logic lives here. The rest of the
//!   application talks to the `ContactStore` trait.
//! - **Bound parameters only:** request values are always bound (`$1`, `$2`, ...).
//!   The only substituted text is the table name, validated once at construction.
//! - **Structured error classification:** driver errors are mapped into
//!   `DbError` by inspecting the database error kind and constraint, so
//!   `DuplicateEmail` is reliably distinguishable from outages.
//!
//! ## Public API
//!
//! - `connect`: builds the connection pool from `DatabaseSettings`.
//! - `ensure_schema`: creates the contacts table when it does not exist.
//! - `ContactStore`: the persistence contract.
//! - `PgContactStore`: the PostgreSQL implementation.
//! - `MemoryContactStore`: an in-process implementation for tests and demos.
//! - `DbError` / `StorageErrorKind`: the errors this crate returns and their classification.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod statements;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, ensure_schema};
pub use error::{DbError, StorageErrorKind};
pub use memory::MemoryContactStore;
pub use repository::{ContactStore, ExecAck, PgContactStore};
pub use statements::Statements;
