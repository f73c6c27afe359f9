//! `ventas-report` library crate.
//!
//! The binary (`ventas`) is a thin wrapper around this library so that:
//!
//! - loading, aggregation and rendering are testable without spawning processes
//! - the text renderer and the TUI share one pipeline
//! - code stays easy to navigate

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
