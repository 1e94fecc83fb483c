//! Domain models for the guest import pipeline.
//!
//! - [`RawRow`] - one decoded spreadsheet row, keyed by the authored header
//! - [`ParsedGuest`] - a normalized, validated row shown in the preview
//! - [`GuestInsertPayload`] - what the batch committer sends to the store
//! - [`Guest`] - a persisted guest as returned by the store
//! - [`RsvpStatus`] - attendance response state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One spreadsheet row: header as authored -> cell value.
///
/// Empty cells are absent from the map.
pub type RawRow = Map<String, Value>;

// =============================================================================
// RSVP Status
// =============================================================================

/// Attendance response state of a guest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// No answer yet. Every imported guest starts here.
    #[default]
    Pending,
    Attending,
    NotAttending,
    Maybe,
}

// =============================================================================
// Parsed Guest
// =============================================================================

/// A spreadsheet row after header normalization and validation.
///
/// Built by [`crate::validation::validate_row`]; `is_valid` is true exactly
/// when `errors` is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedGuest {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plus_one: bool,
    pub plus_one_name: Option<String>,
    pub dietary_preferences: Option<String>,
    pub table_assignment: Option<String>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ParsedGuest {
    /// Insert payload for this guest under the given wedding.
    pub fn to_payload(&self, wedding_id: &str) -> GuestInsertPayload {
        GuestInsertPayload {
            wedding_id: wedding_id.to_string(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            plus_one: self.plus_one,
            plus_one_name: self.plus_one_name.clone(),
            dietary_preferences: self.dietary_preferences.clone(),
            table_assignment: self.table_assignment.clone(),
            rsvp_status: RsvpStatus::Pending,
        }
    }
}

// =============================================================================
// Store Records
// =============================================================================

/// Row inserted into the `guests` collection.
///
/// Absent optional fields serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestInsertPayload {
    pub wedding_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plus_one: bool,
    pub plus_one_name: Option<String>,
    pub dietary_preferences: Option<String>,
    pub table_assignment: Option<String>,
    pub rsvp_status: RsvpStatus,
}

/// A guest as stored in the `guests` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guest {
    pub id: String,
    pub wedding_id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub plus_one: Option<bool>,
    #[serde(default)]
    pub plus_one_name: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Option<String>,
    #[serde(default)]
    pub table_assignment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rsvp_status: Option<RsvpStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    /// Materialize an insert payload the way the store would.
    pub fn from_payload(id: String, payload: GuestInsertPayload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            wedding_id: payload.wedding_id,
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            plus_one: Some(payload.plus_one),
            plus_one_name: payload.plus_one_name,
            dietary_preferences: payload.dietary_preferences,
            table_assignment: payload.table_assignment,
            notes: None,
            rsvp_status: Some(payload.rsvp_status),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guest(name: &str) -> ParsedGuest {
        ParsedGuest {
            full_name: name.to_string(),
            email: None,
            phone: Some("+54 11 1234 5678".into()),
            plus_one: true,
            plus_one_name: Some("María García".into()),
            dietary_preferences: None,
            table_assignment: Some("Mesa 1".into()),
            is_valid: true,
            errors: vec![],
        }
    }

    #[test]
    fn test_payload_defaults_to_pending() {
        let payload = guest("Juan Pérez").to_payload("w-1");
        assert_eq!(payload.wedding_id, "w-1");
        assert_eq!(payload.rsvp_status, RsvpStatus::Pending);
        assert!(payload.plus_one);
    }

    #[test]
    fn test_payload_serializes_missing_fields_as_null() {
        let value = serde_json::to_value(guest("Juan Pérez").to_payload("w-1")).unwrap();
        assert_eq!(value["email"], Value::Null);
        assert_eq!(value["dietary_preferences"], Value::Null);
        assert_eq!(value["rsvp_status"], "pending");
        assert_eq!(value["table_assignment"], "Mesa 1");
    }

    #[test]
    fn test_guest_deserializes_store_row() {
        let row = json!({
            "id": "g-1",
            "wedding_id": "w-1",
            "full_name": "Ana López",
            "email": null,
            "phone": null,
            "plus_one": false,
            "plus_one_name": null,
            "dietary_preferences": null,
            "table_assignment": null,
            "notes": null,
            "rsvp_status": "not_attending",
            "created_at": "2026-01-10T12:00:00+00:00",
            "updated_at": "2026-01-10T12:00:00+00:00"
        });
        let guest: Guest = serde_json::from_value(row).unwrap();
        assert_eq!(guest.rsvp_status, Some(RsvpStatus::NotAttending));
        assert_eq!(guest.plus_one, Some(false));
    }

    #[test]
    fn test_rsvp_wire_values() {
        assert_eq!(
            serde_json::to_value(RsvpStatus::NotAttending).unwrap(),
            "not_attending"
        );
        assert_eq!(serde_json::to_value(RsvpStatus::Maybe).unwrap(), "maybe");
    }
}
