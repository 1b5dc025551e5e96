//! Optional sink for failed link API calls.

use crate::error::ApiResponseError;

/// Receives every non-2xx reply from the link API before the caller gets its
/// fallback value. Wire one up with `LinkResource::with_reporter`.
pub trait ErrorReporter {
    fn report(&self, error: &ApiResponseError);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &ApiResponseError) {
        tracing::error!(status = error.status, body = %error.body, "link API request failed");
    }
}

impl<F> ErrorReporter for F
where
    F: Fn(&ApiResponseError),
{
    fn report(&self, error: &ApiResponseError) {
        self(error)
    }
}
