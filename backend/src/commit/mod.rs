//! Batch committer.
//!
//! Sends the valid guests of a preview to the store as exactly one batch
//! insert. The batch either lands as a whole or not at all; partial success
//! is not an outcome.

use serde::Serialize;

use crate::api::logs::{log_error, log_info, log_success};
use crate::error::{ImportError, ImportResult, StoreResult};
use crate::models::{GuestInsertPayload, ParsedGuest};
use crate::store::GuestStore;

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub inserted: usize,
}

impl CommitOutcome {
    /// Success notification text.
    pub fn message(&self) -> String {
        match self.inserted {
            1 => "1 guest imported".to_string(),
            n => format!("{} guests imported", n),
        }
    }
}

/// Insert payloads for the valid guests, in preview order.
pub fn build_payloads(guests: &[ParsedGuest], wedding_id: &str) -> Vec<GuestInsertPayload> {
    guests
        .iter()
        .filter(|g| g.is_valid)
        .map(|g| g.to_payload(wedding_id))
        .collect()
}

/// Send already-built payloads as one batch.
pub async fn insert_batch<S: GuestStore>(
    store: &S,
    payloads: &[GuestInsertPayload],
) -> StoreResult<CommitOutcome> {
    log_info(format!("📤 Inserting {} guests in one batch...", payloads.len()));

    match store.insert_guests(payloads).await {
        Ok(()) => {
            let outcome = CommitOutcome {
                inserted: payloads.len(),
            };
            log_success(outcome.message());
            Ok(outcome)
        }
        Err(e) => {
            log_error(format!("Batch insert failed: {}", e));
            Err(e)
        }
    }
}

/// Commit the valid guests of `guests` under `wedding_id`.
///
/// With no valid guest this fails with [`ImportError::NoValidRecords`]
/// and the store is never called.
pub async fn commit_guests<S: GuestStore>(
    store: &S,
    wedding_id: &str,
    guests: &[ParsedGuest],
) -> ImportResult<CommitOutcome> {
    let payloads = build_payloads(guests, wedding_id);
    if payloads.is_empty() {
        return Err(ImportError::NoValidRecords);
    }

    Ok(insert_batch(store, &payloads).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::RsvpStatus;
    use crate::store::MemoryStore;
    use crate::validation::validate_row;
    use serde_json::json;

    fn guests(rows: &[serde_json::Value]) -> Vec<ParsedGuest> {
        rows.iter()
            .map(|r| validate_row(r.as_object().unwrap()))
            .collect()
    }

    fn three_of_five() -> Vec<ParsedGuest> {
        guests(&[
            json!({ "Name": "Ana" }),
            json!({ "Name": "" }),
            json!({ "Name": "Luis", "Email": "luis@example.com" }),
            json!({ "Name": "Eva", "Email": "eva@" }),
            json!({ "Name": "Juan", "Plus One": "yes" }),
        ])
    }

    #[test]
    fn test_build_payloads_filters_invalid() {
        let payloads = build_payloads(&three_of_five(), "w-1");
        let names: Vec<_> = payloads.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Luis", "Juan"]);
        assert!(payloads.iter().all(|p| p.wedding_id == "w-1"));
        assert!(payloads.iter().all(|p| p.rsvp_status == RsvpStatus::Pending));
        assert!(payloads[2].plus_one);
    }

    #[tokio::test]
    async fn test_commit_sends_only_valid_in_one_call() {
        let store = MemoryStore::new();
        let outcome = commit_guests(&store, "w-1", &three_of_five()).await.unwrap();

        assert_eq!(outcome.inserted, 3);
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(store.all_guests().len(), 3);
    }

    #[tokio::test]
    async fn test_commit_all_invalid_makes_no_call() {
        let store = MemoryStore::new();
        let all_bad = guests(&[
            json!({}),
            json!({ "Name": " " }),
            json!({ "Name": "A", "Email": "x" }),
            json!({ "Email": "b@x.io" }),
            json!({ "Name": "C", "Email": "c@d" }),
        ]);

        let result = commit_guests(&store, "w-1", &all_bad).await;
        assert!(matches!(result, Err(ImportError::NoValidRecords)));
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_commit_store_failure() {
        let store = MemoryStore::new();
        store.fail_next_insert(StoreError::Rejected {
            status: 500,
            message: "boom".into(),
        });

        let result = commit_guests(&store, "w-1", &three_of_five()).await;
        assert!(matches!(result, Err(ImportError::Store(_))));
        assert!(store.all_guests().is_empty());
    }

    #[test]
    fn test_outcome_message() {
        assert_eq!(CommitOutcome { inserted: 1 }.message(), "1 guest imported");
        assert_eq!(CommitOutcome { inserted: 12 }.message(), "12 guests imported");
    }
}
