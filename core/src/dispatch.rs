//! In-process dispatch of one request against one handler.

use crate::handler::Handler;
use crate::http::HttpRequest;
use crate::recorder::{ExecutionResult, ResponseRecorder};
use crate::reporter::FailureReporter;

const INTERNAL_SERVER_ERROR: u16 = 500;

/// Run `request` through `handler` and capture the response.
///
/// Never fails. A handler error is reported through `reporter` and, if the
/// handler had not written a status yet, turns the result into a 500.
/// Handler panics are not caught.
pub fn dispatch<H>(
    handler: &H,
    request: &HttpRequest,
    reporter: &dyn FailureReporter,
) -> ExecutionResult
where
    H: Handler + ?Sized,
{
    let label = format!("{} {}", request.method, request.path);
    dispatch_as(&label, handler, request, reporter)
}

pub(crate) fn dispatch_as<H>(
    label: &str,
    handler: &H,
    request: &HttpRequest,
    reporter: &dyn FailureReporter,
) -> ExecutionResult
where
    H: Handler + ?Sized,
{
    let mut recorder = ResponseRecorder::new();

    if let Err(err) = handler.serve(request, &mut recorder) {
        tracing::warn!(%err, "{label}: handler failed");
        reporter.record_failure(&format!("{label}: handler failed: {err}"));
        if !recorder.status_written() {
            recorder.write_status(INTERNAL_SERVER_ERROR);
        }
    }

    let result = recorder.finish();
    tracing::debug!(
        method = %request.method,
        path = %request.path,
        status = result.status(),
        body_len = result.body().len(),
        "dispatched"
    );
    result
}
