//! Row validation for imported guests.
//!
//! Each raw row is normalized and checked field by field. Failures never
//! abort the import: they are collected on the [`ParsedGuest`] so the
//! preview can show them next to the row.
//!
//! # Rules
//!
//! 1. `full_name` must be non-empty after trimming.
//! 2. `email`, when given, must look like `local@domain.tld`.
//!
//! Both rules always run, so a row can carry both messages.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use guestlist::validation::validate_row;
//!
//! let row = json!({ "Name": "Ana", "Email": "not-an-email" });
//! let guest = validate_row(row.as_object().unwrap());
//! assert!(!guest.is_valid);
//! assert_eq!(guest.errors, vec!["invalid email"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::models::{ParsedGuest, RawRow};
use crate::transform::fields::{normalize_row, NormalizedRow};

/// Tokens that mark a guest as bringing a plus-one.
pub const TRUTHY_TOKENS: [&str; 6] = ["sí", "si", "yes", "true", "1", "x"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A per-row validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowError {
    NameRequired,
    InvalidEmail,
}

impl RowError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NameRequired => "name required",
            Self::InvalidEmail => "invalid email",
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Simple `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Interpret a plus-one cell. Anything outside [`TRUTHY_TOKENS`] is `false`.
pub fn coerce_plus_one(value: &str) -> bool {
    let token = value.to_lowercase();
    TRUTHY_TOKENS.contains(&token.trim())
}

/// Trimmed text, `None` when nothing is left.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Validate an already-normalized row.
pub fn validate_normalized(row: NormalizedRow) -> ParsedGuest {
    let mut errors: Vec<RowError> = Vec::new();

    let full_name = row.full_name.trim().to_string();
    if full_name.is_empty() {
        errors.push(RowError::NameRequired);
    }

    // The pattern runs on the value as authored, so padded addresses fail.
    if !row.email.is_empty() && !is_valid_email(&row.email) {
        errors.push(RowError::InvalidEmail);
    }

    // Name emptiness is checked again on its own: the flag must never be
    // true for a blank name, whatever the error list holds.
    let is_valid = errors.is_empty() && !full_name.is_empty();

    ParsedGuest {
        full_name,
        email: optional(&row.email),
        phone: optional(&row.phone),
        plus_one: coerce_plus_one(&row.plus_one),
        plus_one_name: optional(&row.plus_one_name),
        dietary_preferences: optional(&row.dietary_preferences),
        table_assignment: optional(&row.table_assignment),
        is_valid,
        errors: errors.iter().map(ToString::to_string).collect(),
    }
}

/// Normalize and validate one raw row.
pub fn validate_row(row: &RawRow) -> ParsedGuest {
    validate_normalized(normalize_row(row))
}

/// Validate every row, keeping the original order.
pub fn validate_rows(rows: &[RawRow]) -> Vec<ParsedGuest> {
    rows.iter().map(validate_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn check(value: Value) -> ParsedGuest {
        validate_row(value.as_object().unwrap())
    }

    #[test]
    fn test_spanish_row_is_valid() {
        let guest = check(json!({ "Nombre Completo": "Juan Pérez" }));
        assert_eq!(guest.full_name, "Juan Pérez");
        assert!(guest.is_valid);
        assert!(!guest.plus_one);
        assert!(guest.errors.is_empty());
        assert_eq!(guest.email, None);
    }

    #[test]
    fn test_invalid_email_only() {
        let guest = check(json!({ "Name": "Ana", "Email": "not-an-email" }));
        assert!(!guest.is_valid);
        assert_eq!(guest.errors, vec!["invalid email"]);
    }

    #[test]
    fn test_missing_name() {
        let guest = check(json!({ "Email": "ana@example.com" }));
        assert!(!guest.is_valid);
        assert_eq!(guest.errors, vec!["name required"]);
    }

    #[test]
    fn test_whitespace_name_is_invalid() {
        let guest = check(json!({ "Nombre": "   ", "Email": "ana@example.com" }));
        assert!(!guest.is_valid);
        assert_eq!(guest.full_name, "");
        assert!(guest.errors.contains(&"name required".to_string()));
    }

    #[test]
    fn test_errors_are_collected_in_order() {
        let guest = check(json!({ "Nombre": "", "Correo": "a@b" }));
        assert_eq!(guest.errors, vec!["name required", "invalid email"]);
    }

    #[test]
    fn test_empty_email_is_not_an_error() {
        let guest = check(json!({ "Name": "Ana", "Email": "" }));
        assert!(guest.is_valid);
        assert_eq!(guest.email, None);
    }

    #[test]
    fn test_padded_email_fails() {
        let guest = check(json!({ "Name": "Ana", "Email": " ana@example.com" }));
        assert_eq!(guest.errors, vec!["invalid email"]);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("juan@ejemplo.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("juan@ejemplo"));
        assert!(!is_valid_email("juan ejemplo@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("juan@@x.com"));
    }

    #[test]
    fn test_plus_one_truthy_tokens() {
        for token in ["Sí", "SI ", "yes", "TRUE", "1", "x", " X "] {
            assert!(coerce_plus_one(token), "{token:?} should be true");
        }
        for token in ["no", "", "2", "No", "false", "0"] {
            assert!(!coerce_plus_one(token), "{token:?} should be false");
        }
    }

    #[test]
    fn test_plus_one_from_number_and_bool_cells() {
        assert!(check(json!({ "Name": "Ana", "Plus One": 1 })).plus_one);
        assert!(check(json!({ "Name": "Ana", "Plus One": true })).plus_one);
        assert!(!check(json!({ "Name": "Ana", "Plus One": 2 })).plus_one);
        assert!(!check(json!({ "Name": "Ana" })).plus_one);
    }

    #[test]
    fn test_optional_fields_are_trimmed() {
        let guest = check(json!({
            "Nombre": "  Luis  ",
            "Teléfono": " 555 ",
            "Nombre Acompañante": "   ",
            "Dieta": " Vegano",
            "Mesa": 4
        }));
        assert_eq!(guest.full_name, "Luis");
        assert_eq!(guest.phone.as_deref(), Some("555"));
        assert_eq!(guest.plus_one_name, None);
        assert_eq!(guest.dietary_preferences.as_deref(), Some("Vegano"));
        assert_eq!(guest.table_assignment.as_deref(), Some("4"));
    }

    #[test]
    fn test_validity_matches_error_list() {
        let rows = [
            json!({}),
            json!({ "Name": "Ana" }),
            json!({ "Name": " ", "Email": "bad" }),
            json!({ "Name": "Ana", "Email": "bad" }),
            json!({ "Name": "Ana", "Email": "ana@x.io", "Plus One": "maybe" }),
            json!({ "Phone": "555" }),
        ];
        for row in rows {
            let guest = check(row);
            assert_eq!(guest.is_valid, guest.errors.is_empty());
            if guest.full_name.trim().is_empty() {
                assert!(!guest.is_valid);
            }
        }
    }

    #[test]
    fn test_validate_rows_keeps_order() {
        let rows: Vec<RawRow> = [json!({ "Name": "B" }), json!({}), json!({ "Name": "A" })]
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        let guests = validate_rows(&rows);
        assert_eq!(guests[0].full_name, "B");
        assert!(!guests[1].is_valid);
        assert_eq!(guests[2].full_name, "A");
    }
}
