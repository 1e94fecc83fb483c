//! Error types for the guest import pipeline.
//!
//! One enum per layer, converted upward with `#[from]` so `?` works across
//! boundaries:
//!
//! - [`ParseError`] - the spreadsheet could not be decoded
//! - [`StoreError`] - the hosted data store rejected or failed a call
//! - [`SessionError`] - an import session was asked to do something its
//!   current step does not allow
//! - [`ImportError`] - everything an import can surface to the user
//! - [`TemplateError`] - the example spreadsheet could not be written
//! - [`ConfigError`] / [`ServerError`] - startup and server failures
//!
//! Per-row validation failures are not errors: they are collected on each
//! [`crate::models::ParsedGuest`] and shown in the preview.

use thiserror::Error;

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while decoding a spreadsheet into raw rows.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a workbook calamine understands.
    #[error("Invalid spreadsheet: {0}")]
    Workbook(String),

    /// The workbook has no sheet to read.
    #[error("Spreadsheet contains no sheets")]
    NoSheets,
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the hosted data store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The store answered with a non-success status.
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The store answered with a body we could not decode.
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::InvalidResponse(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors from the import session state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No session with this id.
    #[error("Import session not found: {0}")]
    NotFound(String),

    /// The session was closed; pending results are dropped.
    #[error("Import session is closed")]
    Closed,

    /// The current step does not allow the requested action.
    #[error("Cannot {action} while {step}")]
    InvalidTransition {
        step: &'static str,
        action: &'static str,
    },

    /// The registry lock was poisoned by a panicking holder.
    #[error("Import session registry is unavailable")]
    LockPoisoned,
}

// =============================================================================
// Import Errors (user facing)
// =============================================================================

/// Everything an import can report to the user.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File extension is not `.xlsx` or `.xls`; nothing was decoded.
    #[error("Unsupported file format: {0} (expected .xlsx or .xls)")]
    UnsupportedFormat(String),

    /// The spreadsheet could not be decoded.
    #[error("Could not read spreadsheet: {0}")]
    Parse(#[from] ParseError),

    /// Commit attempted with zero valid rows; no store call was made.
    #[error("No valid guests to import")]
    NoValidRecords,

    /// The batch insert failed; nothing is assumed to be persisted.
    #[error("Guest import failed: {0}")]
    Store(#[from] StoreError),

    /// The session state machine refused the action.
    #[error(transparent)]
    Session(#[from] SessionError),
}

// =============================================================================
// Template Errors
// =============================================================================

/// Errors while writing the example spreadsheet.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to build template: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write template: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Configuration & Server Errors
// =============================================================================

/// Missing or malformed configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidVar { name: &'static str, value: String },
}

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for session transitions.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
