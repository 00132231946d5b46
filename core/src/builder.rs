//! Fluent construction of one request.
//!
//! # Design
//! Every mutator takes the builder by value and hands it back, and
//! `dispatch` consumes it. Touching a request after it was sent is
//! therefore a compile error rather than a runtime surprise.

use serde::Serialize;

use crate::assertions::AssertionChain;
use crate::dispatch::dispatch_as;
use crate::handler::Handler;
use crate::harness::Harness;
use crate::http::{HttpRequest, Method};

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// A request under construction, bound to the harness that will send it.
#[must_use = "a request does nothing until `dispatch` is called"]
pub struct RequestBuilder<'a, H> {
    harness: &'a Harness<'a, H>,
    request: HttpRequest,
}

impl<'a, H: Handler> RequestBuilder<'a, H> {
    pub(crate) fn new(harness: &'a Harness<'a, H>, method: Method, path: String) -> Self {
        let builder = Self {
            harness,
            request: HttpRequest::new(method, path),
        };
        if !builder.request.has_valid_path() {
            builder.harness.reporter().record_failure(&format!(
                "{}: request path must begin with '/' or be an absolute URI",
                builder.label()
            ));
        }
        builder
    }

    /// Set a request header, replacing any value already set under the
    /// same name in any letter case.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(name, value);
        self
    }

    /// Serialize `value` as the JSON body.
    ///
    /// Adds `Content-Type: application/json` unless a content type was
    /// already set. A value that cannot be serialized halts the test.
    pub fn send<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.request.body = Some(bytes);
                if !self.request.headers.contains(CONTENT_TYPE) {
                    self.request.headers.insert(CONTENT_TYPE, APPLICATION_JSON);
                }
            }
            Err(err) => {
                self.harness.reporter().record_failure_and_halt(&format!(
                    "{}: failed to encode request body as JSON: {err}",
                    self.label()
                ));
            }
        }
        self
    }

    /// Use `body` verbatim. Headers are left alone.
    pub fn send_string(mut self, body: impl Into<String>) -> Self {
        self.request.body = Some(body.into().into_bytes());
        self
    }

    pub fn send_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// The request as it would be sent now.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Send the request to the harness's handler and wrap the response for
    /// assertions.
    pub fn dispatch(self) -> AssertionChain<'a> {
        let label = self.label();
        let result = dispatch_as(
            &label,
            self.harness.handler(),
            &self.request,
            self.harness.reporter(),
        );
        AssertionChain::new(self.harness.reporter(), label, result)
    }

    fn label(&self) -> String {
        format!(
            "{}: {} {}",
            self.harness.name(),
            self.request.method,
            self.request.path
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::http::HttpRequest;
    use crate::recorder::ResponseRecorder;
    use crate::reporter::RecordingReporter;
    use crate::Harness;

    fn noop(_: &HttpRequest, _: &mut ResponseRecorder) {}

    #[test]
    fn starts_empty() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let builder = harness.get("/");
        assert!(builder.request().headers.is_empty());
        assert!(builder.request().body.is_none());
    }

    #[test]
    fn add_header_overwrites_by_name() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let builder = harness
            .get("/")
            .add_header("X-Token", "first")
            .add_header("x-token", "second");
        assert_eq!(builder.request().headers.len(), 1);
        assert_eq!(builder.request().header("X-Token"), Some("second"));
    }

    #[test]
    fn send_encodes_json_and_sets_content_type() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let builder = harness.post("/").send(&serde_json::json!({"a": 1}));
        assert_eq!(builder.request().header("content-type"), Some("application/json"));
        assert_eq!(builder.request().body_text(), r#"{"a":1}"#);
    }

    #[test]
    fn send_keeps_an_explicit_content_type() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let builder = harness
            .post("/")
            .add_header("content-type", "application/vnd.api+json")
            .send(&[1, 2, 3]);
        assert_eq!(builder.request().headers.len(), 1);
        assert_eq!(
            builder.request().header("Content-Type"),
            Some("application/vnd.api+json")
        );
    }

    #[test]
    fn send_string_has_no_header_side_effect() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let builder = harness.put("/").send_string("raw");
        assert!(builder.request().headers.is_empty());
        assert_eq!(builder.request().body_text(), "raw");
    }

    #[test]
    fn last_body_source_wins() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let builder = harness.post("/").send(&"json").send_bytes(vec![0xff]);
        assert_eq!(builder.request().body_bytes(), [0xff]);
    }

    #[test]
    fn unserializable_body_halts() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop).named("encode");
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "non-string keys are not valid JSON");
        let builder = harness.post("/").send(&map);
        assert!(builder.request().body.is_none());

        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].halted);
        assert!(failures[0]
            .message
            .starts_with("encode: POST /: failed to encode request body as JSON"));
    }

    #[test]
    fn relative_path_is_reported() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop).named("paths");
        let _ = harness.get("relative");
        assert_eq!(
            reporter.messages(),
            ["paths: GET relative: request path must begin with '/' or be an absolute URI"]
        );
    }

    #[test]
    fn absolute_uri_is_accepted() {
        let reporter = RecordingReporter::new();
        let harness = Harness::new(&reporter, noop);
        let _ = harness.get("http://example.com/x");
        assert!(reporter.is_empty());
    }
}
