//! Resolution of session display names.

use chrono::Local;

use crate::{Error, ReportFormat, SESSION_TIMESTAMP_FORMAT};

/// Capability of a request-like object to expose the URL it was made for.
///
/// The instrumentation layer adapts whatever request type the profiled application uses to
/// this trait. The engine uses it to name sessions after the request they serve and to
/// recognize requests for the profiling report (see [`Engine::try_serve()`][1]).
///
/// Adapters for the `http` crate types are provided.
///
/// # Examples
///
/// ```
/// use alloc_profiler::{Error, RequestUrl};
///
/// struct LegacyRequest {
///     path: Option<String>,
/// }
///
/// impl RequestUrl for LegacyRequest {
///     fn request_url(&self) -> Result<String, Error> {
///         self.path.clone().ok_or_else(|| Error::Enrichment {
///             problem: "request has no path".to_string(),
///         })
///     }
/// }
/// ```
///
/// [1]: crate::Engine::try_serve
pub trait RequestUrl {
    /// Returns the URL of the request, without any query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Enrichment`] if the URL cannot be determined.
    fn request_url(&self) -> Result<String, Error>;
}

/// Builds the display name of a new session.
///
/// The base name is normalized to use `.` as the only separator. A URL obtained from the hint
/// replaces the base name entirely. Failure to obtain one is logged and the base name is kept.
pub(crate) fn session_name(
    base: &str,
    hint: Option<&dyn RequestUrl>,
    format: ReportFormat,
) -> String {
    let mut name = match hint.map(RequestUrl::request_url) {
        Some(Ok(url)) if !url.is_empty() => url,
        Some(Ok(_)) => normalize(base),
        Some(Err(error)) => {
            tracing::warn!(%error, base, "unable to enrich session name, keeping the base name");
            normalize(base)
        }
        None => normalize(base),
    };

    if format == ReportFormat::Verbose {
        let timestamp = Local::now().format(SESSION_TIMESTAMP_FORMAT);
        name = format!("{timestamp} {name}");
    }

    name
}

fn normalize(base: &str) -> String {
    base.replace('/', ".")
}
