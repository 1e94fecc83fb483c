//! In-process guest store.
//!
//! Backs `guestlist import --dry-run` and the tests. It keeps the same
//! all-or-nothing contract as the hosted store and counts batch calls so
//! callers can assert how many requests were made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::GuestStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Guest, GuestInsertPayload};

#[derive(Default)]
pub struct MemoryStore {
    guests: Mutex<Vec<Guest>>,
    insert_calls: AtomicUsize,
    fail_next: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert fail with `err`, storing nothing.
    pub fn fail_next_insert(&self, err: StoreError) {
        *lock(&self.fail_next) = Some(err);
    }

    /// Number of batch inserts attempted so far.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Everything stored, across weddings.
    pub fn all_guests(&self) -> Vec<Guest> {
        lock(&self.guests).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl GuestStore for MemoryStore {
    async fn insert_guests(&self, payloads: &[GuestInsertPayload]) -> StoreResult<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = lock(&self.fail_next).take() {
            return Err(err);
        }

        let now = Utc::now();
        let mut guests = lock(&self.guests);
        guests.extend(
            payloads
                .iter()
                .cloned()
                .map(|payload| Guest::from_payload(Uuid::new_v4().to_string(), payload, now)),
        );
        Ok(())
    }

    async fn list_guests(&self, wedding_id: &str) -> StoreResult<Vec<Guest>> {
        let mut guests: Vec<Guest> = lock(&self.guests)
            .iter()
            .filter(|g| g.wedding_id == wedding_id)
            .cloned()
            .collect();
        guests.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(guests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RsvpStatus;

    fn payload(wedding: &str, name: &str) -> GuestInsertPayload {
        GuestInsertPayload {
            wedding_id: wedding.into(),
            full_name: name.into(),
            email: None,
            phone: None,
            plus_one: false,
            plus_one_name: None,
            dietary_preferences: None,
            table_assignment: None,
            rsvp_status: RsvpStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_scoped_by_wedding() {
        let store = MemoryStore::new();
        store
            .insert_guests(&[payload("w-1", "Zoe"), payload("w-1", "Ana"), payload("w-2", "Luis")])
            .await
            .unwrap();

        let guests = store.list_guests("w-1").await.unwrap();
        let names: Vec<_> = guests.iter().map(|g| g.full_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Zoe"]);
        assert_eq!(guests[0].rsvp_status, Some(RsvpStatus::Pending));
        assert_eq!(store.insert_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_stores_nothing() {
        let store = MemoryStore::new();
        store.fail_next_insert(StoreError::Http("connection reset".into()));

        let result = store.insert_guests(&[payload("w-1", "Ana")]).await;
        assert!(result.is_err());
        assert!(store.all_guests().is_empty());

        store.insert_guests(&[payload("w-1", "Ana")]).await.unwrap();
        assert_eq!(store.all_guests().len(), 1);
        assert_eq!(store.insert_calls(), 2);
    }
}
