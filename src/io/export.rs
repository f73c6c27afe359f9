//! Export the run summary to JSON.
//!
//! The export is opt-in (`--export-json`); a default run writes nothing to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::report::ReportSummary;

/// Write the report summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &ReportSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let export_err = |message: String| AppError::Export {
        path: path.to_path_buf(),
        message,
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary).map_err(|e| export_err(e.to_string()))?;
    writer.flush().map_err(|e| export_err(e.to_string()))?;

    tracing::info!(path = %path.display(), "wrote summary JSON");
    Ok(())
}
