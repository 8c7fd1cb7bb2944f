use crate::error::DbError;
use crate::repository::{ContactStore, ExecAck};
use async_trait::async_trait;
use core_types::{Contact, ContactId};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An in-process `ContactStore` with the same observable contract as the
/// PostgreSQL table: sequential identifiers starting at 1, a unique email
/// column, and zero-row updates/deletes for unknown identifiers.
///
/// The lock is only held for the duration of a single map operation.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Contact>,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .iter()
            .any(|(id, row)| Some(*id) != except && row.email == email)
    }
}

fn duplicate(email: &str) -> DbError {
    DbError::DuplicateEmail(format!(
        "duplicate key value violates unique constraint on email {email:?}"
    ))
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn fetch_all(&self) -> Result<Vec<Contact>, DbError> {
        Ok(self.lock().rows.values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: ContactId) -> Result<Option<Contact>, DbError> {
        Ok(self.lock().rows.get(&id.get()).cloned())
    }

    async fn insert(&self, contact: &Contact) -> Result<ContactId, DbError> {
        let mut state = self.lock();
        if state.email_taken(&contact.email, None) {
            return Err(duplicate(&contact.email));
        }
        state.last_id += 1;
        let id = ContactId::new(state.last_id);
        state.rows.insert(id.get(), contact.clone().with_id(id));
        Ok(id)
    }

    async fn update(&self, id: ContactId, contact: &Contact) -> Result<ExecAck, DbError> {
        let mut state = self.lock();
        if !state.rows.contains_key(&id.get()) {
            return Ok(ExecAck { rows_affected: 0 });
        }
        if state.email_taken(&contact.email, Some(id.get())) {
            return Err(duplicate(&contact.email));
        }
        state.rows.insert(id.get(), contact.clone().with_id(id));
        Ok(ExecAck { rows_affected: 1 })
    }

    async fn delete(&self, id: ContactId) -> Result<ExecAck, DbError> {
        let removed = self.lock().rows.remove(&id.get());
        Ok(ExecAck { rows_affected: u64::from(removed.is_some()) })
    }

    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: &str) -> Contact {
        Contact::new("Grace", "Hopper", email, "555-0199")
    }

    #[tokio::test]
    async fn assigns_sequential_identifiers() {
        let store = MemoryContactStore::new();
        let first = store.insert(&contact("a@example.com")).await.unwrap();
        let second = store.insert(&contact("b@example.com")).await.unwrap();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);

        let stored = store.fetch_by_id(second).await.unwrap().unwrap();
        assert_eq!(stored.id, "2");
        assert_eq!(stored.email, "b@example.com");
    }

    #[tokio::test]
    async fn enforces_unique_email_on_insert_and_update() {
        let store = MemoryContactStore::new();
        store.insert(&contact("a@example.com")).await.unwrap();
        let b = store.insert(&contact("b@example.com")).await.unwrap();

        let err = store.insert(&contact("a@example.com")).await.unwrap_err();
        assert!(err.is_duplicate_email());

        let err = store.update(b, &contact("a@example.com")).await.unwrap_err();
        assert!(err.is_duplicate_email());

        // Rewriting a row with its own email is not a conflict.
        let ack = store.update(b, &contact("b@example.com")).await.unwrap();
        assert_eq!(ack.rows_affected, 1);
    }

    #[tokio::test]
    async fn unknown_identifiers_affect_zero_rows() {
        let store = MemoryContactStore::new();
        let ghost = ContactId::new(99);
        assert_eq!(store.update(ghost, &contact("x@example.com")).await.unwrap().rows_affected, 0);
        assert_eq!(store.delete(ghost).await.unwrap().rows_affected, 0);
        assert!(store.is_empty());
    }
}
