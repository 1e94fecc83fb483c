//! Application state for one wedding.
//!
//! Views that show tenant data get a `&WeddingState` / `&mut WeddingState`
//! explicitly. Any operation that mutates the store calls
//! [`WeddingState::refresh`] afterwards so the cached collections match
//! what was just written.

use crate::api::logs::{log_success, log_warning};
use crate::commit::CommitOutcome;
use crate::error::{ImportError, StoreResult};
use crate::models::Guest;
use crate::session::ImportSession;
use crate::store::GuestStore;

#[derive(Debug, Clone, Default)]
pub struct WeddingState {
    wedding_id: String,
    guests: Vec<Guest>,
    loaded: bool,
}

impl WeddingState {
    pub fn new(wedding_id: impl Into<String>) -> Self {
        Self {
            wedding_id: wedding_id.into(),
            guests: Vec::new(),
            loaded: false,
        }
    }

    pub fn wedding_id(&self) -> &str {
        &self.wedding_id
    }

    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    /// Whether at least one refresh succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Open an import dialog for this wedding.
    pub fn open_import(&self) -> ImportSession {
        ImportSession::new(self.wedding_id.clone())
    }

    /// Re-fetch every tenant-scoped collection held here.
    pub async fn refresh<S: GuestStore>(&mut self, store: &S) -> StoreResult<()> {
        self.guests = store.list_guests(&self.wedding_id).await?;
        self.loaded = true;
        Ok(())
    }

    /// Commit an import session and refresh on success.
    ///
    /// The import already happened when the refresh runs, so a refresh
    /// failure is only logged; the stale list is kept until the next one.
    pub async fn commit_import<S: GuestStore>(
        &mut self,
        session: &mut ImportSession,
        store: &S,
    ) -> Result<CommitOutcome, ImportError> {
        let outcome = session.commit(store).await?;

        match self.refresh(store).await {
            Ok(()) => log_success(format!("{} guests on the list", self.guests.len())),
            Err(e) => log_warning(format!("Guests imported but refresh failed: {}", e)),
        }

        Ok(outcome)
    }
}
