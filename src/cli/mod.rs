//! Command-line parsing for the sales report generator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! loading/aggregation/rendering code.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{AverageWindow, OutputMode, ReportConfig};

/// Default input file, looked up in the working directory.
pub const DEFAULT_INPUT: &str = "ventas_tienda.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ventas", version, about = "Sales report generator: product totals, monthly trends, revenue")]
pub struct Cli {
    /// Sales CSV (`producto`, `mes`, `cantidad`, optional `precio_unitario`).
    #[arg(value_name = "CSV", env = "VENTAS_CSV", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Where to show the report.
    #[arg(short, long, value_enum, default_value_t = OutputMode::Tui)]
    pub output: OutputMode,

    /// Divisor for average units per month.
    #[arg(long, value_enum, default_value_t = AverageWindow::Fixed)]
    pub average_window: AverageWindow,

    /// Also write the computed summary to a JSON file.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Log filter (e.g. `warn`, `info`, `debug`). `RUST_LOG` takes precedence.
    #[arg(long, env = "VENTAS_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            input: self.input.clone(),
            output: self.output,
            average_window: self.average_window,
            export_json: self.export_json.clone(),
        }
    }
}
