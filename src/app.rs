//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (after loading `.env`)
//! - loads and aggregates the sales table
//! - shows each artifact (TUI or text)
//! - writes the optional JSON export

use std::io::IsTerminal;

use clap::Parser;

use crate::domain::{OutputMode, ReportConfig};
use crate::error::AppError;

pub mod bootstrap;
pub mod pipeline;

/// Text-mode layout when stdout is not a terminal.
const TEXT_WIDTH: usize = 80;
const TEXT_HEIGHT: usize = 14;

/// Entry point for the `ventas` binary.
pub fn run() -> Result<(), AppError> {
    let dotenv = bootstrap::load_dotenv();
    let cli = crate::cli::Cli::parse();
    bootstrap::setup_logging(&cli.log_level);
    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = resolve_output(cli.report_config(), std::io::stdout().is_terminal());
    tracing::info!(input = %config.input.display(), output = ?config.output, "starting report");

    let run = pipeline::run_report(&config)?;

    match config.output {
        OutputMode::Text => {
            println!("{}", crate::report::format::format_run_summary(&run.ingest, &run.report));
            let mut printer = pipeline::TextPrinter::new(std::io::stdout().lock(), TEXT_WIDTH, TEXT_HEIGHT);
            pipeline::present(&run.report, &mut printer)?;
        }
        OutputMode::Tui => {
            let mut viewer = crate::tui::TerminalViewer::new(run.report.artifacts().count())?;
            let outcome = pipeline::present(&run.report, &mut viewer);
            // Restore the terminal before anything is printed.
            let notices = viewer.finish();
            for notice in notices {
                println!("{notice}");
            }
            outcome?;
        }
    }

    if let Some(path) = &config.export_json {
        crate::io::export::write_summary_json(path, &run.report.summary)?;
    }

    Ok(())
}

/// The TUI needs a real terminal; fall back to text when stdout is redirected.
fn resolve_output(mut config: ReportConfig, stdout_is_terminal: bool) -> ReportConfig {
    if config.output == OutputMode::Tui && !stdout_is_terminal {
        tracing::info!("stdout is not a terminal; using text output");
        config.output = OutputMode::Text;
    }
    config
}
