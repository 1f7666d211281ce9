//! Delivery of rendered reports to the console or a result file.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::Error;
use crate::pal::{Output, OutputFacade};

/// Where rendered reports are written.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ResultSink {
    /// Standard error of the process.
    #[default]
    Console,

    /// A file that is truncated and rewritten on every write, so it always holds exactly the
    /// most recent bulk report.
    File(PathBuf),
}

/// Serializes all writes to the configured sink.
///
/// If the result file cannot be written, the text goes to the console instead.
#[derive(Debug)]
pub(crate) struct ResultWriter {
    sink: ResultSink,
    output: OutputFacade,

    // Reports are written rarely compared to how often events arrive, so one coarse lock for
    // every sink write is fine and keeps concurrent file rewrites from interleaving.
    write_lock: Mutex<()>,
}

impl ResultWriter {
    pub(crate) fn new(sink: ResultSink) -> Self {
        Self::with_output(sink, OutputFacade::target())
    }

    pub(crate) fn with_output(sink: ResultSink, output: OutputFacade) -> Self {
        Self {
            sink,
            output,
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Writes text that represents the full session history.
    ///
    /// The text is rendered while holding the write lock, so the report written last is also
    /// the one rendered last and the result file never falls behind the history. The rendered
    /// text must be newline-terminated.
    pub(crate) fn write_report(&self, render: impl FnOnce() -> String) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let text = render();

        match &self.sink {
            ResultSink::Console => self.output.write_console(&text),
            ResultSink::File(path) => {
                if let Err(source) = self.output.overwrite_file(path, &text) {
                    let error = Error::Sink {
                        path: path.clone(),
                        source,
                    };

                    tracing::warn!(%error, "falling back to console for profiler results");
                    self.output.write_console(&text);
                }
            }
        }
    }

    /// Writes the rendered line of one just-finished session to the console.
    ///
    /// Only console sinks receive individual lines; a result file receives full reports only.
    pub(crate) fn write_line(&self, line: &str) {
        if self.sink != ResultSink::Console {
            return;
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.output.write_console(&format!("{line}\n"));
    }
}
