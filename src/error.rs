use std::path::PathBuf;

use thiserror::Error;

/// All errors that can terminate a report run.
///
/// Every variant maps to a process exit code via [`AppError::exit_code`].
#[derive(Error, Debug)]
pub enum AppError {
    /// The input file could not be opened or read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed before any row could be validated.
    #[error("Failed to parse CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The table is missing a required column or is otherwise malformed.
    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("No valid rows remain after validation ({rows_read} read).")]
    EmptyDataset { rows_read: usize },

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Failed to write export '{path}': {message}")]
    Export { path: PathBuf, message: String },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Io { .. } | AppError::Csv { .. } | AppError::DataFormat(_) => 2,
            AppError::EmptyDataset { .. } => 3,
            AppError::Terminal(_) | AppError::Export { .. } => 4,
        }
    }
}
