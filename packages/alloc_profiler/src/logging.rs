//! Installation of the diagnostic log subscriber.
//!
//! The profiler reports its own problems (unbalanced close calls, unwritable result files,
//! failed name enrichment) through `tracing`. Applications that already install a subscriber
//! receive these events there. Otherwise, [`init_logging()`] installs a plain-text subscriber
//! according to the profiler configuration.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::{Config, Error};

/// Installs a subscriber that writes profiler diagnostics at the configured level to the
/// configured log file, or to stderr if there is none.
///
/// The log file is truncated when logging is initialized and appended to afterwards. If it
/// cannot be opened, diagnostics go to stderr instead.
///
/// Returns `false` if a global subscriber was already installed, in which case that subscriber
/// remains in place and receives the profiler diagnostics.
#[cfg_attr(test, mutants::skip)] // Process-global state, covered by the logging integration test.
pub fn init_logging(config: &Config) -> bool {
    let level = config.log_level().level_filter();

    let log_file = config.log_file().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(source) => {
            let error = Error::Sink {
                path: path.clone(),
                source,
            };

            // There is no subscriber yet, so this is the only way to say anything.
            eprintln!("{error}; logging to the console instead");
            None
        }
    });

    let installed = match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .try_init(),
    }
    .is_ok();

    if installed {
        tracing::info!(level = %config.log_level(), "profiler logging initialized");
    }

    installed
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}
