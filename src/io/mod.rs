//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - optional JSON summary export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
