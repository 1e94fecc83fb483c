//! Header normalization for guest spreadsheets.
//!
//! People author guest lists by hand, in Spanish or English, so each
//! logical field accepts several header spellings. The lookup is a static,
//! case-sensitive alias table; the first alias present in the row wins.

use serde_json::Value;

use crate::models::RawRow;
use crate::parser::MAX_SAFE_INTEGER;

/// Logical fields of a guest row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuestField {
    FullName,
    Email,
    Phone,
    PlusOne,
    PlusOneName,
    DietaryPreferences,
    TableAssignment,
}

impl GuestField {
    /// All fields, in template column order.
    pub const ALL: [GuestField; 7] = [
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::PlusOne,
        Self::PlusOneName,
        Self::DietaryPreferences,
        Self::TableAssignment,
    ];

    /// Accepted headers in priority order: Spanish, English, lowercase.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::FullName => &["Nombre Completo", "Nombre", "Name", "Full Name", "nombre"],
            Self::Email => &["Email", "email", "Correo", "correo"],
            Self::Phone => &["Teléfono", "Telefono", "Phone", "Tel", "telefono"],
            Self::PlusOne => &[
                "Tiene Acompañante",
                "Acompañante",
                "Plus One",
                "Has Plus One",
                "acompañante",
            ],
            Self::PlusOneName => &[
                "Nombre Acompañante",
                "Plus One Name",
                "Nombre del Acompañante",
            ],
            Self::DietaryPreferences => &[
                "Preferencias Alimentarias",
                "Dieta",
                "Dietary",
                "Dietary Preferences",
                "preferencias",
            ],
            Self::TableAssignment => &["Mesa", "Table", "mesa"],
        }
    }

    /// Column name in the `guests` collection.
    pub fn column(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::PlusOne => "plus_one",
            Self::PlusOneName => "plus_one_name",
            Self::DietaryPreferences => "dietary_preferences",
            Self::TableAssignment => "table_assignment",
        }
    }
}

/// A row with every logical field resolved to text.
///
/// Values are untrimmed; a missing field is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub plus_one: String,
    pub plus_one_name: String,
    pub dietary_preferences: String,
    pub table_assignment: String,
}

/// Text form of a cell value.
///
/// Integers print without a fraction, booleans as `true`/`false`. Integral
/// floats beyond the exact integer range keep their float form.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Resolve one field: first alias holding a non-empty value.
pub fn resolve(row: &RawRow, field: GuestField) -> String {
    field
        .aliases()
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(value_to_string)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Resolve every logical field of a raw row.
pub fn normalize_row(row: &RawRow) -> NormalizedRow {
    NormalizedRow {
        full_name: resolve(row, GuestField::FullName),
        email: resolve(row, GuestField::Email),
        phone: resolve(row, GuestField::Phone),
        plus_one: resolve(row, GuestField::PlusOne),
        plus_one_name: resolve(row, GuestField::PlusOneName),
        dietary_preferences: resolve(row, GuestField::DietaryPreferences),
        table_assignment: resolve(row, GuestField::TableAssignment),
    }
}

/// Headers that no field recognizes; their columns are ignored.
pub fn unrecognized_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    headers
        .into_iter()
        .filter(|header| {
            !GuestField::ALL
                .iter()
                .any(|field| field.aliases().contains(&header.as_str()))
        })
        .cloned()
        .collect()
}
