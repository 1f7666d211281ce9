//! Constants shared across the profiler.

use std::num::NonZero;

use new_zealand::nz;

/// How many finished sessions the history buffer keeps unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: NonZero<usize> = nz!(50);

/// Request URLs ending with this suffix are answered with the bulk report.
pub const REPORT_PATH_SUFFIX: &str = "profiler";

/// Format of the timestamp prepended to session names in verbose mode.
pub(crate) const SESSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
