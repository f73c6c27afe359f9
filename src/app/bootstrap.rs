//! Process-level setup: `.env` loading and the tracing subscriber.

use std::path::PathBuf;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Load a `.env` file from the working directory, if there is one.
///
/// Values already present in the environment win. Returns the file used.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Initialise the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used as the filter directive,
/// falling back to `warn` if it does not parse. Output goes to stderr so it
/// never mixes with the report on stdout.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    if let Err(err) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        tracing::debug!("keeping the existing tracing subscriber: {err}");
    }
}
