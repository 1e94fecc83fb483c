//! Spreadsheet decoder.
//!
//! Turns `.xlsx` / `.xls` bytes into raw rows keyed by header. Only the
//! first sheet is read; its first row supplies the keys for every row
//! below it. No guest-specific logic here.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use crate::error::{ImportError, ParseError, ParseResult};
use crate::models::RawRow;

/// File extensions accepted at the upload boundary.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Key used for a blank header cell, as spreadsheet tools commonly do.
const EMPTY_HEADER: &str = "__EMPTY";

/// Largest float that still converts to an exact integer.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Reject anything that is not `.xlsx` / `.xls` before decoding.
///
/// # Example
/// ```ignore
/// use guestlist::parser::check_extension;
///
/// assert!(check_extension("invitados.XLSX").is_ok());
/// assert!(check_extension("invitados.csv").is_err());
/// ```
pub fn check_extension(file_name: &str) -> Result<(), ImportError> {
    let accepted = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false);

    if accepted {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat(file_name.to_string()))
    }
}

/// Text form of a cell, used for headers.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// JSON form of a cell, `None` for anything that counts as empty.
pub fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::String(v) if v.is_empty() => None,
        Data::String(v) => Some(Value::String(v.clone())),
        Data::Int(v) => Some(Value::Number((*v).into())),
        Data::Float(v) => float_to_value(*v),
        Data::Bool(v) => Some(Value::Bool(*v)),
        Data::DateTime(v) => Some(Value::String(v.to_string())),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Some(Value::String(v.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}

/// Spreadsheets store every number as a float; integral ones become
/// integers so "1" and "5491112345678" stringify without a fraction.
fn float_to_value(v: f64) -> Option<Value> {
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        Some(Value::Number((v as i64).into()))
    } else {
        Number::from_f64(v).map(Value::Number)
    }
}

/// Decode spreadsheet bytes into raw rows.
///
/// The format is sniffed from the content, so a mislabeled file fails here
/// rather than at the extension check.
pub fn decode_bytes(bytes: &[u8]) -> ParseResult<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoSheets)?
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header_row) => header_keys(header_row),
        None => return Ok(Vec::new()),
    };

    let records = rows
        .filter_map(|row| {
            let mut record = RawRow::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                if let Some(value) = cell_to_value(cell) {
                    record.insert(header.clone(), value);
                }
            }
            (!record.is_empty()).then_some(record)
        })
        .collect();

    Ok(records)
}

/// Decode a spreadsheet file from disk.
pub fn decode_file<P: AsRef<Path>>(path: P) -> ParseResult<Vec<RawRow>> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_bytes(&bytes)
}

/// Build unique keys from the header row.
///
/// Header text is kept as authored. Empty cells become `__EMPTY`,
/// `__EMPTY_1`, ...; repeated headers get `_1`, `_2`, ... so no column
/// silently overwrites another.
fn header_keys(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    row.iter()
        .map(|cell| {
            let text = cell_to_string(cell);
            let base = if text.is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                text
            };

            let count = seen.entry(base.clone()).or_insert(0);
            let key = if *count == 0 {
                base
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            key
        })
        .collect()
}
