//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes [`Snapshot`](crate::models::Snapshot)s as dated JSON files

pub mod json;
