//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical month ordering (`Month`, `MONTH_WINDOW`)
//! - sales records and the loaded dataset (`SalesRecord`, `Dataset`)
//! - run configuration enums (`AverageWindow`, `OutputMode`)

pub mod types;

pub use types::*;
