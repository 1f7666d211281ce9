//! Error conditions reported by the profiler.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ThreadKey;

/// Errors that can occur in the profiling engine.
///
/// Only [`Error::InvalidConfiguration`] is ever returned to callers. The other variants describe
/// problems that the engine recovers from locally; they are reported through `tracing` and never
/// propagate out of the session or event operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A session was closed on a thread that has no open session.
    #[error("close requested on thread {thread} but it has no open session")]
    UnbalancedClose {
        /// The thread that requested the close.
        thread: ThreadKey,
    },

    /// A session name could not be derived from the request hint supplied at open time.
    #[error("unable to extract a request URL: {problem}")]
    Enrichment {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// The configured result or log file could not be written.
    #[error("unable to write to '{}': {source}", path.display())]
    Sink {
        /// The file that could not be written.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The startup configuration could not be parsed or is not valid.
    #[error("invalid configuration: '{invalid_value}' is invalid: {problem}")]
    InvalidConfiguration {
        /// The specific value that was invalid. This may either be an entire configuration item
        /// or a specific part of it, depending on the problem.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },
}

/// A specialized `Result` type for profiler operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
