//! High-level import pipeline: file -> reviewable preview.
//!
//! Combines the extension gate, the decoder, header normalization and row
//! validation in one pass.
//!
//! # Example
//!
//! ```rust,ignore
//! use guestlist::transform::pipeline::parse_guest_file;
//! use std::path::Path;
//!
//! let preview = parse_guest_file(Path::new("invitados.xlsx"))?;
//! println!("{} valid, {} invalid", preview.valid_count(), preview.invalid_count());
//! ```

use std::path::Path;

use super::fields::unrecognized_headers;
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{ImportResult, ParseError};
use crate::models::RawRow;
use crate::parser::{check_extension, decode_bytes};
use crate::preview::ImportPreview;
use crate::validation::validate_rows;

/// Parse an uploaded spreadsheet into a preview.
///
/// Fails with [`crate::ImportError::UnsupportedFormat`] before touching the bytes
/// when the name is not `.xlsx` / `.xls`, and with [`crate::ImportError::Parse`]
/// when the bytes are not a workbook. Invalid rows are not errors.
pub fn parse_guests(file_name: &str, bytes: &[u8]) -> ImportResult<ImportPreview> {
    check_extension(file_name)?;

    log_info(format!("📖 Reading {} ({} bytes)", file_name, bytes.len()));
    let rows = decode_bytes(bytes)?;
    log_success(format!("Read {} rows from the first sheet", rows.len()));

    Ok(preview_rows(&rows))
}

/// Parse a spreadsheet from disk.
pub fn parse_guest_file(path: &Path) -> ImportResult<ImportPreview> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    check_extension(&file_name)?;

    let bytes = std::fs::read(path).map_err(ParseError::from)?;
    parse_guests(&file_name, &bytes)
}

/// Validate decoded rows and report what was found.
pub fn preview_rows(rows: &[RawRow]) -> ImportPreview {
    let headers = collect_headers(rows);
    let ignored = unrecognized_headers(&headers);
    if !ignored.is_empty() {
        log_warning(format!("Ignoring unrecognized columns: {}", ignored.join(", ")));
    }

    let preview = ImportPreview::new(validate_rows(rows));

    if preview.invalid_count() > 0 {
        log_warning(format!(
            "{} valid, {} invalid guests",
            preview.valid_count(),
            preview.invalid_count()
        ));
    } else {
        log_success(format!("All {} guests valid", preview.valid_count()));
    }

    preview
}

/// Every header seen, in first-seen order.
fn collect_headers(rows: &[RawRow]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !headers.contains(key) {
            headers.push(key.clone());
        }
    }
    headers
}
