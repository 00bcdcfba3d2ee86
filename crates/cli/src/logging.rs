//! Tracing subscriber setup. Only the binary installs a subscriber; the
//! library crates just emit events.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::exit_codes::EXIT_RUNTIME;
use crate::CliError;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `log_file`, events are
/// appended to that file without ANSI colors and stderr stays reserved for
/// the human summary.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    tracing::debug!(args = ?std::env::args().collect::<Vec<_>>(), "tally started");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, CliError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot open log file {}: {e}", path.display())))
}
