//! Serving the bulk report in response to requests intercepted from the profiled application.

use std::io;

use http::{Request, Response, StatusCode, Uri};

use crate::{Error, REPORT_PATH_SUFFIX, Report, RequestUrl};

/// Capability of a response-like object to receive the profiling report.
///
/// The instrumentation layer adapts whatever response type the profiled application uses to
/// this trait. Adapters for `http::Response<Vec<u8>>` and `http::Response<String>` are provided.
pub trait ReportResponse {
    /// Sets the status code of the response.
    fn set_status(&mut self, status: StatusCode);

    /// Appends text to the body of the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be written, for example because the
    /// underlying connection is gone.
    fn write_body(&mut self, text: &str) -> io::Result<()>;
}

/// Answers the request with the report if its URL ends with the report path suffix.
///
/// Returns `true` if the response now holds the report. The report is only rendered once the
/// request is known to be a report request. The status is only set once the body has been
/// written, so a failed write leaves the status untouched.
pub(crate) fn try_serve(
    request: &dyn RequestUrl,
    response: &mut dyn ReportResponse,
    report: impl FnOnce() -> Report,
) -> bool {
    let url = match request.request_url() {
        Ok(url) => url,
        Err(error) => {
            tracing::debug!(%error, "dispatcher request has no usable URL");
            return false;
        }
    };

    tracing::debug!(url = %url, "dispatcher request received");

    if !url.ends_with(REPORT_PATH_SUFFIX) {
        return false;
    }

    if let Err(error) = response.write_body(&report().to_string()) {
        tracing::error!(%error, url = %url, "unable to write profiler report to response");
        return false;
    }

    response.set_status(StatusCode::OK);
    true
}

/// The URL of a request as scheme, authority and path, without the query string. Requests in
/// origin form (no authority) yield the path alone.
fn url_without_query(uri: &Uri) -> String {
    match (uri.scheme_str(), uri.authority()) {
        (Some(scheme), Some(authority)) => format!("{scheme}://{authority}{}", uri.path()),
        _ => uri.path().to_string(),
    }
}

impl RequestUrl for Uri {
    fn request_url(&self) -> Result<String, Error> {
        Ok(url_without_query(self))
    }
}

impl<B> RequestUrl for Request<B> {
    fn request_url(&self) -> Result<String, Error> {
        self.uri().request_url()
    }
}

impl ReportResponse for Response<Vec<u8>> {
    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn write_body(&mut self, text: &str) -> io::Result<()> {
        self.body_mut().extend_from_slice(text.as_bytes());
        Ok(())
    }
}

impl ReportResponse for Response<String> {
    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn write_body(&mut self, text: &str) -> io::Result<()> {
        self.body_mut().push_str(text);
        Ok(())
    }
}
