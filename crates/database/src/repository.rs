use crate::error::DbError;
use crate::statements::Statements;
use async_trait::async_trait;
use core_types::{Contact, ContactId};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::FromRow;

/// Acknowledgment returned by statements that do not produce rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecAck {
    pub rows_affected: u64,
}

/// The persistence contract for contacts.
///
/// Every method takes and returns the domain entity, never raw rows. The
/// service holds this as a trait object so that PostgreSQL and the in-memory
/// double are interchangeable.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Fetches every contact, ordered by identifier.
    async fn fetch_all(&self) -> Result<Vec<Contact>, DbError>;

    /// Fetches the contact with the given identifier, if any.
    async fn fetch_by_id(&self, id: ContactId) -> Result<Option<Contact>, DbError>;

    /// Inserts a new contact and returns the identifier storage assigned to it.
    /// The `id` field of the input is ignored.
    async fn insert(&self, contact: &Contact) -> Result<ContactId, DbError>;

    /// Overwrites every field of the contact stored under `id`.
    /// Updating an identifier that does not exist affects zero rows.
    async fn update(&self, id: ContactId, contact: &Contact) -> Result<ExecAck, DbError>;

    async fn delete(&self, id: ContactId) -> Result<ExecAck, DbError>;

    /// Round-trips to storage to prove it is reachable.
    async fn health_check(&self) -> Result<(), DbError>;
}

// This struct represents a row fetched from the contacts table.
#[derive(FromRow, Debug)]
struct ContactRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id.to_string(),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// The PostgreSQL-backed `ContactStore`. It owns the pool and the statement text.
#[derive(Debug, Clone)]
pub struct PgContactStore {
    pool: PgPool,
    statements: Statements,
}

impl PgContactStore {
    /// Creates a new store over a shared connection pool.
    pub fn new(pool: PgPool, table: &str) -> Result<Self, DbError> {
        let statements = Statements::for_table(table)?;
        Ok(Self { pool, statements })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn statements(&self) -> &Statements {
        &self.statements
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn fetch_all(&self) -> Result<Vec<Contact>, DbError> {
        let rows = sqlx::query_as::<_, ContactRow>(&self.statements.select_all)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn fetch_by_id(&self, id: ContactId) -> Result<Option<Contact>, DbError> {
        let row = sqlx::query_as::<_, ContactRow>(&self.statements.select_by_id)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Contact::from))
    }

    async fn insert(&self, contact: &Contact) -> Result<ContactId, DbError> {
        let id: i64 = sqlx::query_scalar(&self.statements.insert)
            .bind(&contact.first_name)
            .bind(&contact.last_name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(ContactId::new(id))
    }

    async fn update(&self, id: ContactId, contact: &Contact) -> Result<ExecAck, DbError> {
        let result = sqlx::query(&self.statements.update)
            .bind(&contact.first_name)
            .bind(&contact.last_name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(ExecAck { rows_affected: result.rows_affected() })
    }

    async fn delete(&self, id: ContactId) -> Result<ExecAck, DbError> {
        let result = sqlx::query(&self.statements.delete)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(ExecAck { rows_affected: result.rows_affected() })
    }

    async fn health_check(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
