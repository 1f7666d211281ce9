//! Rendering of finished sessions into short or verbose text.

use std::fmt;
use std::sync::Arc;

use crate::Session;

/// How sessions are rendered into text.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ReportFormat {
    /// Machine-parsable, one session per line:
    /// `name;owner_objects;owner_bytes;global_objects;global_bytes`
    Short,

    /// Human-readable sentences including the execution time of the session.
    /// Session names are also prefixed with the time the session was opened.
    #[default]
    Verbose,
}

impl Session {
    /// Renders the session as a single line of text in the requested format.
    ///
    /// # Examples
    ///
    /// ```
    /// use alloc_profiler::{Config, Engine, ReportFormat, ThreadKey};
    ///
    /// let engine = Engine::new(Config::builder().format(ReportFormat::Short).build());
    ///
    /// let session = engine.open("f1", None);
    /// engine.on_memory_allocated(ThreadKey::current(), 128);
    /// engine.close();
    ///
    /// assert_eq!(session.render(ReportFormat::Short), "f1;0;128;0;128");
    /// ```
    #[must_use]
    pub fn render(&self, format: ReportFormat) -> String {
        let counts = self.counts();

        match format {
            ReportFormat::Short => format!(
                "{};{};{};{};{}",
                self.name(),
                counts.owner_objects(),
                counts.owner_bytes(),
                counts.global_objects(),
                counts.global_bytes()
            ),
            ReportFormat::Verbose => format!(
                "{} Execution time:{} ms. In method's thread created tracking objects: {}, \
                 consumed memory: {} bytes. In all threads created tracking objects: {}, \
                 consumed memory: {} bytes.",
                self.name(),
                self.elapsed().as_millis(),
                counts.owner_objects(),
                counts.owner_bytes(),
                counts.global_objects(),
                counts.global_bytes()
            ),
        }
    }
}

/// The rendered contents of the session history at one point in time, oldest session first.
///
/// The `Display` implementation produces the bulk report: a header line followed by one line
/// per session. For programmatic access, use [`lines()`](Self::lines).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub(crate) fn from_sessions(sessions: &[Arc<Session>], format: ReportFormat) -> Self {
        Self {
            lines: sessions
                .iter()
                .map(|session| session.render(format))
                .collect(),
        }
    }

    /// How many sessions the report covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the report covers no sessions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The rendered sessions, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Consumes the report, returning the rendered sessions, oldest first.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Profiler result for last {} items:", self.lines.len())?;

        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
