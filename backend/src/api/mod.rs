//! HTTP API module.
//!
//! The server behind the import dialog, its wire types, and the progress
//! log broadcaster every pipeline step reports through.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server, AppState};
pub use types::*;
