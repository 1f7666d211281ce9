//! Startup configuration of the profiling engine.

use std::fmt;
use std::num::NonZero;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use crate::{DEFAULT_HISTORY_CAPACITY, Error, ReportFormat, Result, ResultSink};

/// Minimum severity of the diagnostic messages the profiler logs.
///
/// Every severity is gated by the same rule: a message is logged if it is at least as severe
/// as the configured level.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum LogLevel {
    /// Everything, including per-class instrumentation decisions of the hook layer.
    Trace,

    /// Diagnostics useful when integrating the profiler into an application.
    Debug,

    /// Session lifecycle messages.
    Info,

    /// Recoverable problems, such as a result file that cannot be written.
    Warn,

    /// Misuse of the profiler, such as unbalanced close calls.
    #[default]
    Error,
}

impl LogLevel {
    /// The `tracing` filter that implements this level.
    #[must_use]
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "err" | "error" => Ok(Self::Error),
            _ => Err(Error::InvalidConfiguration {
                invalid_value: s.to_string(),
                problem: "expected one of Err, Warn, Info, Debug, Trace".to_string(),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "Trace",
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Err",
        };

        f.write_str(name)
    }
}

/// Configuration of an [`Engine`][crate::Engine], fixed when the engine is created.
///
/// Use [`Config::builder()`] to assemble one in code, or parse the compact option string
/// format used on the command line of instrumented processes:
///
/// ```
/// use alloc_profiler::{Config, ReportFormat};
///
/// let config: Config = "hist:20,short:true,logLevel:Warn".parse().unwrap();
///
/// assert_eq!(config.history_capacity().get(), 20);
/// assert_eq!(config.format(), ReportFormat::Short);
/// ```
///
/// Recognized keys:
///
/// * `hist:<n>` - how many finished sessions to keep for reporting (default 50).
/// * `short:true` - use the machine-parsable short report format.
/// * `resultFile:<path>` - write reports to this file instead of the console.
/// * `logFile:<path>` - write diagnostic logs to this file instead of the console.
/// * `logLevel:Err|Warn|Info|Debug|Trace` - minimum severity of diagnostic logs (default `Err`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    history_capacity: NonZero<usize>,
    format: ReportFormat,
    result_sink: ResultSink,
    log_level: LogLevel,
    log_file: Option<PathBuf>,
}

impl Config {
    /// Starts building a configuration from the default values.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            config: Self::default(),
        }
    }

    /// How many finished sessions are kept for reporting.
    #[must_use]
    pub fn history_capacity(&self) -> NonZero<usize> {
        self.history_capacity
    }

    /// How sessions are rendered.
    #[must_use]
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Where rendered reports are written.
    #[must_use]
    pub fn result_sink(&self) -> &ResultSink {
        &self.result_sink
    }

    /// Minimum severity of diagnostic logs.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// File to write diagnostic logs to, if not the console.
    #[must_use]
    pub fn log_file(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            format: ReportFormat::default(),
            result_sink: ResultSink::default(),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut builder = Self::builder();

        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (key, value) = item
                .split_once(':')
                .map(|(key, value)| (key.trim(), value.trim()))
                .filter(|(key, value)| !key.is_empty() && !value.is_empty())
                .ok_or_else(|| invalid(item, "expected 'key:value'"))?;

            builder = match key {
                "hist" => builder.history_capacity(
                    value
                        .parse()
                        .map_err(|_parse_error| invalid(item, "expected a positive integer"))?,
                ),
                "short" => builder.format(if value.eq_ignore_ascii_case("true") {
                    ReportFormat::Short
                } else {
                    ReportFormat::Verbose
                }),
                "resultFile" => builder.result_sink(ResultSink::File(PathBuf::from(value))),
                "logFile" => builder.log_file(value),
                "logLevel" => builder.log_level(value.parse()?),
                _ => return Err(invalid(item, "unknown configuration key")),
            };
        }

        Ok(builder.build())
    }
}

fn invalid(item: &str, problem: &str) -> Error {
    Error::InvalidConfiguration {
        invalid_value: item.to_string(),
        problem: problem.to_string(),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hist:{}", self.history_capacity)?;
        writeln!(f, "short:{}", self.format == ReportFormat::Short)?;

        match &self.result_sink {
            ResultSink::Console => writeln!(f, "resultFile:CONSOLE")?,
            ResultSink::File(path) => writeln!(f, "resultFile:{}", path.display())?,
        }

        match &self.log_file {
            None => writeln!(f, "logFile:CONSOLE")?,
            Some(path) => writeln!(f, "logFile:{}", path.display())?,
        }

        writeln!(f, "logLevel:{}", self.log_level)
    }
}

/// Assembles a [`Config`].
///
/// Use [`Config::builder()`] to create a new instance of this builder.
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets how many finished sessions are kept for reporting. Defaults to 50.
    #[must_use]
    pub fn history_capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Sets how sessions are rendered. Defaults to [`ReportFormat::Verbose`].
    #[must_use]
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Sets where rendered reports are written. Defaults to the console.
    #[must_use]
    pub fn result_sink(mut self, sink: ResultSink) -> Self {
        self.config.result_sink = sink;
        self
    }

    /// Sets the minimum severity of diagnostic logs. Defaults to [`LogLevel::Error`].
    #[must_use]
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// Sets the file to write diagnostic logs to. Defaults to the console.
    #[must_use]
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    /// Finishes building the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
