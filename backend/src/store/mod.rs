//! Data-access collaborator for the `guests` collection.
//!
//! The hosted store owns persistence and tenant isolation; this crate only
//! issues batch inserts and reads through [`GuestStore`]:
//!
//! - [`SupabaseClient`] - REST client for the hosted store
//! - [`MemoryStore`] - in-process store for dry runs and tests

pub mod memory;
pub mod supabase;

use std::future::Future;

use crate::error::StoreResult;
use crate::models::{Guest, GuestInsertPayload};

pub use memory::MemoryStore;
pub use supabase::SupabaseClient;

/// Name of the collection guests are stored in.
pub const GUESTS_COLLECTION: &str = "guests";

/// Tenant-scoped access to stored guests.
pub trait GuestStore {
    /// Insert all payloads as one batch. Either every row is stored or the
    /// call fails.
    fn insert_guests(
        &self,
        payloads: &[GuestInsertPayload],
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Guests of one wedding, ordered by name.
    fn list_guests(&self, wedding_id: &str) -> impl Future<Output = StoreResult<Vec<Guest>>> + Send;
}
