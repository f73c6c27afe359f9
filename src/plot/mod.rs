//! Plain-text rendering of report artifacts.

pub mod ascii;

pub use ascii::*;
