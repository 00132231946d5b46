//! Entry point binding a failure reporter to the handler under test.

use crate::builder::RequestBuilder;
use crate::handler::{Handler, ServiceHandler};
use crate::http::Method;
use crate::reporter::FailureReporter;

/// Issues requests against one handler and reports into one reporter.
///
/// Holds no per-request state: every `request(..).dispatch()` round trip is
/// independent of the others.
///
/// ```
/// use htest::{Harness, HttpRequest, ResponseRecorder, TestReporter};
///
/// let t = TestReporter::new();
/// let test = Harness::new(&t, |req: &HttpRequest, res: &mut ResponseRecorder| {
///     res.set_header("foo", req.header("foo").unwrap_or_default());
///     res.write(req.body_bytes());
/// });
///
/// test.get("/path")
///     .add_header("foo", "barbar")
///     .send_string("my data")
///     .dispatch()
///     .expect_body("my data")
///     .expect_header("foo", "barbar");
/// ```
pub struct Harness<'r, H> {
    reporter: &'r dyn FailureReporter,
    handler: H,
    name: String,
}

impl<'r, H> Harness<'r, H> {
    /// The harness is named after the current thread, which the Rust test
    /// runner names after the running test.
    pub fn new(reporter: &'r dyn FailureReporter, handler: H) -> Self {
        let name = std::thread::current()
            .name()
            .unwrap_or("htest")
            .to_string();
        Self {
            reporter,
            handler,
            name,
        }
    }

    /// Override the name used to prefix failure messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn reporter(&self) -> &'r dyn FailureReporter {
        self.reporter
    }
}

impl<'r, S> Harness<'r, ServiceHandler<S>> {
    /// Test a tower service such as an axum `Router`.
    pub fn service(reporter: &'r dyn FailureReporter, service: S) -> Self {
        Self::new(reporter, ServiceHandler::new(service))
    }
}

impl<'r, H: Handler> Harness<'r, H> {
    pub fn request(
        &self,
        method: impl Into<Method>,
        path: impl Into<String>,
    ) -> RequestBuilder<'_, H> {
        RequestBuilder::new(self, method.into(), path.into())
    }

    pub fn get(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Get, path)
    }

    pub fn head(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Head, path)
    }

    pub fn post(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Post, path)
    }

    pub fn put(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Put, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Patch, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Delete, path)
    }

    pub fn options(&self, path: impl Into<String>) -> RequestBuilder<'_, H> {
        self.request(Method::Options, path)
    }
}
