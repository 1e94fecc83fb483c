//! # Guestlist - bulk guest import for wedding planning
//!
//! Guestlist turns a spreadsheet of guests into validated records, shows a
//! preview, and inserts the valid ones into the hosted data store scoped to
//! one wedding.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ .xlsx/.xls  │────▶│   Parser    │────▶│ Normalizer  │────▶│  Validator  │────▶│   Preview   │
//! │   upload    │     │ (1st sheet) │     │  (aliases)  │     │ (name/email)│     │ (valid/inv) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                                        │ confirm
//!                                                                                 ┌──────▼──────┐
//!                                                                                 │ Batch insert│
//!                                                                                 └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use guestlist::{parse_guest_file, MemoryStore, WeddingState};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let mut state = WeddingState::new("wedding-1");
//!     let mut session = state.open_import();
//!
//!     let bytes = std::fs::read("invitados.xlsx").unwrap();
//!     session.load_file("invitados.xlsx", &bytes).unwrap();
//!     let outcome = state.commit_import(&mut session, &store).await.unwrap();
//!     println!("{}", outcome.message());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`models`] - Guest records and insert payloads
//! - [`parser`] - Spreadsheet decoding
//! - [`transform`] - Header normalization and the preview pipeline
//! - [`validation`] - Per-row validation
//! - [`preview`] - Reviewable import preview
//! - [`commit`] - Batch insert of valid rows
//! - [`store`] - Hosted data store client
//! - [`session`] - Import dialog state machine
//! - [`state`] - Per-wedding application state
//! - [`template`] - Example workbook generation
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Import flow
pub mod commit;
pub mod preview;
pub mod session;
pub mod state;

// Persistence
pub mod store;

// Template
pub mod template;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ImportError, ParseError, ServerError, SessionError, StoreError, TemplateError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Guest, GuestInsertPayload, ParsedGuest, RawRow, RsvpStatus};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use parser::{check_extension, decode_bytes, decode_file};
pub use preview::{ImportPreview, PreviewRow, RowStatus};
pub use transform::pipeline::{parse_guest_file, parse_guests, preview_rows};
pub use transform::{normalize_row, GuestField, NormalizedRow};
pub use validation::{validate_row, validate_rows, RowError};

// =============================================================================
// Re-exports - Commit & Store
// =============================================================================

pub use commit::{commit_guests, CommitOutcome};
pub use config::{ServerConfig, StoreConfig};
pub use store::{GuestStore, MemoryStore, SupabaseClient};

// =============================================================================
// Re-exports - Session & State
// =============================================================================

pub use session::{ImportSession, ImportStep, SessionRegistry, SessionView};
pub use state::WeddingState;

// =============================================================================
// Re-exports - Template
// =============================================================================

pub use template::{template_bytes, write_template, TemplateLanguage};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
