// Real output that writes to stderr and the filesystem.

use std::io::{self, Write};
use std::path::Path;

use crate::pal::Output;

/// Writes to stderr and the real filesystem.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetOutput;

// Trivial forwarder to system APIs - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Output for BuildTargetOutput {
    fn write_console(&self, text: &str) {
        // Nowhere left to report a failure to write to stderr.
        _ = io::stderr().lock().write_all(text.as_bytes());
    }

    fn overwrite_file(&self, path: &Path, text: &str) -> io::Result<()> {
        std::fs::write(path, text)
    }
}
