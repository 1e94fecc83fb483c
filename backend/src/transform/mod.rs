//! Transformation module.
//!
//! Turns decoded rows into reviewable guests:
//! - Fields: header alias table and per-row normalization
//! - Pipeline: file -> preview in one pass

pub mod fields;
pub mod pipeline;

pub use fields::{normalize_row, resolve, GuestField, NormalizedRow};
pub use pipeline::*;
