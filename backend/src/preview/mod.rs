//! Reviewable import preview.
//!
//! Every parsed row stays in the preview, valid or not, in file order. The
//! user sees counts, each row's resolved fields, and either a ready marker
//! or the row's errors before deciding to commit.

use serde::{Deserialize, Serialize};

use crate::models::ParsedGuest;

/// Placeholder shown for an empty cell.
const EMPTY_CELL: &str = "-";

/// Parsed guests of one uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub guests: Vec<ParsedGuest>,
}

/// Per-row status in the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum RowStatus {
    Ready,
    Invalid(String),
}

/// One line of the preview table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    /// 1-based position in the file (header excluded).
    pub position: usize,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plus_one: bool,
    pub plus_one_name: Option<String>,
    pub dietary_preferences: Option<String>,
    pub table_assignment: Option<String>,
    pub status: RowStatus,
}

impl ImportPreview {
    pub fn new(guests: Vec<ParsedGuest>) -> Self {
        Self { guests }
    }

    pub fn len(&self) -> usize {
        self.guests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.guests.iter().filter(|g| g.is_valid).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.guests.iter().filter(|g| !g.is_valid).count()
    }

    /// Guests that will be sent on commit.
    pub fn valid_guests(&self) -> impl Iterator<Item = &ParsedGuest> {
        self.guests.iter().filter(|g| g.is_valid)
    }

    /// `"ready"` when nothing is invalid, `"warning"` otherwise.
    pub fn status(&self) -> &'static str {
        if self.invalid_count() == 0 {
            "ready"
        } else {
            "warning"
        }
    }

    /// Table rows for display.
    pub fn rows(&self) -> Vec<PreviewRow> {
        self.guests
            .iter()
            .enumerate()
            .map(|(index, guest)| PreviewRow {
                position: index + 1,
                full_name: guest.full_name.clone(),
                email: guest.email.clone(),
                phone: guest.phone.clone(),
                plus_one: guest.plus_one,
                plus_one_name: guest.plus_one_name.clone(),
                dietary_preferences: guest.dietary_preferences.clone(),
                table_assignment: guest.table_assignment.clone(),
                status: if guest.is_valid {
                    RowStatus::Ready
                } else {
                    RowStatus::Invalid(guest.errors.join(", "))
                },
            })
            .collect()
    }

    /// Plain-text table for terminals.
    pub fn render_table(&self) -> String {
        let rows = self.rows();
        let name_width = column_width("Name", rows.iter().map(|r| r.full_name.as_str()));
        let email_width = column_width("Email", rows.iter().map(|r| cell(&r.email)));
        let phone_width = column_width("Phone", rows.iter().map(|r| cell(&r.phone)));

        let mut out = format!(
            "{:>4}  {:<name_width$}  {:<email_width$}  {:<phone_width$}  {:<8}  Status\n",
            "#", "Name", "Email", "Phone", "Plus one",
        );

        for row in &rows {
            let name = if row.full_name.is_empty() {
                EMPTY_CELL
            } else {
                row.full_name.as_str()
            };
            let status = match &row.status {
                RowStatus::Ready => "ready".to_string(),
                RowStatus::Invalid(message) => message.clone(),
            };
            out.push_str(&format!(
                "{:>4}  {:<name_width$}  {:<email_width$}  {:<phone_width$}  {:<8}  {}\n",
                row.position,
                name,
                cell(&row.email),
                cell(&row.phone),
                if row.plus_one { "yes" } else { "no" },
                status,
            ));
        }

        out.push_str(&format!(
            "\n{} valid, {} invalid\n",
            self.valid_count(),
            self.invalid_count()
        ));
        out
    }
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(EMPTY_CELL)
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
