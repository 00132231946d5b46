//! Chainable checks over one captured response.
//!
//! # Design
//! Each `expect_*` reads the `ExecutionResult`, reports a mismatch through
//! the `FailureReporter`, and returns the same chain. A mismatch never stops
//! the chain, so every check in one statement runs and reports on its own.
//! The only escalation is `expect_json` on a body that cannot be decoded at
//! all, which asks the reporter to halt.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::recorder::ExecutionResult;
use crate::reporter::FailureReporter;

/// Assertions over the response of one dispatched request.
#[must_use = "a response is only checked through its `expect_*` methods"]
pub struct AssertionChain<'a> {
    reporter: &'a dyn FailureReporter,
    label: String,
    result: ExecutionResult,
}

impl<'a> AssertionChain<'a> {
    pub(crate) fn new(
        reporter: &'a dyn FailureReporter,
        label: String,
        result: ExecutionResult,
    ) -> Self {
        Self {
            reporter,
            label,
            result,
        }
    }

    /// The captured response, for checks the chain does not cover.
    pub fn result(&self) -> &ExecutionResult {
        &self.result
    }

    pub fn into_result(self) -> ExecutionResult {
        self.result
    }

    pub fn expect_status(&self, expected: u16) -> &Self {
        let actual = self.result.status();
        tracing::trace!(expected, actual, "{}: expect_status", self.label);
        if actual != expected {
            self.fail(format_args!("expected status {expected}, got {actual}"));
        }
        self
    }

    /// Exact text comparison; an empty body equals `""`.
    pub fn expect_body(&self, expected: &str) -> &Self {
        tracing::trace!("{}: expect_body", self.label);
        if self.result.body() != expected.as_bytes() {
            self.fail(format_args!(
                "expected body {expected:?}, got {:?}",
                self.result.body_text()
            ));
        }
        self
    }

    /// Case-insensitive header check. An empty `expected` means the header
    /// must be absent or empty; both count as a match.
    pub fn expect_header(&self, name: &str, expected: &str) -> &Self {
        tracing::trace!(name, "{}: expect_header", self.label);
        let actual = self.result.header(name);
        let observed = actual.unwrap_or_default();
        if observed == expected {
            return self;
        }

        if expected.is_empty() {
            self.fail(format_args!(
                "expected header {name:?} to be absent or empty, got {observed:?}"
            ));
        } else if actual.is_none() {
            self.fail(format_args!(
                "expected header {name:?} to be {expected:?}, but it is not set"
            ));
        } else {
            self.fail(format_args!(
                "expected header {name:?} to be {expected:?}, got {observed:?}"
            ));
        }
        self
    }

    pub fn expect_cookie(&self, name: &str, expected: &str) -> &Self {
        tracing::trace!(name, "{}: expect_cookie", self.label);
        match self.result.cookie(name) {
            None => self.fail(format_args!(
                "expected cookie {name:?} to be {expected:?}, but it was not set"
            )),
            Some(actual) if actual != expected => self.fail(format_args!(
                "expected cookie {name:?} to be {expected:?}, got {actual:?}"
            )),
            Some(_) => {}
        }
        self
    }

    /// Decode the body as `T` and compare it with `expected`.
    ///
    /// A body that is not JSON, or does not fit `T`, halts. A body that
    /// decodes but differs is reported field by field.
    pub fn expect_json<T>(&self, expected: &T) -> &Self
    where
        T: Serialize + DeserializeOwned + PartialEq + Debug,
    {
        tracing::trace!("{}: expect_json", self.label);
        let body: Value = match serde_json::from_slice(self.result.body()) {
            Ok(body) => body,
            Err(err) => {
                self.halt(format_args!("body is not valid JSON: {err}"));
                return self;
            }
        };
        let actual = match T::deserialize(&body) {
            Ok(actual) => actual,
            Err(err) => {
                self.halt(format_args!(
                    "body does not match the expected JSON shape: {err}"
                ));
                return self;
            }
        };
        if actual == *expected {
            return self;
        }

        let mut differences = Vec::new();
        if let (Ok(expected), Ok(actual)) =
            (serde_json::to_value(expected), serde_json::to_value(&actual))
        {
            json_differences("$", &expected, &actual, &mut differences);
        }
        if differences.is_empty() {
            self.fail(format_args!(
                "expected JSON body {expected:?}, got {actual:?}"
            ));
        } else {
            self.fail(format_args!(
                "JSON body differs from expected:\n  {}",
                differences.join("\n  ")
            ));
        }
        self
    }

    fn fail(&self, message: std::fmt::Arguments<'_>) {
        self.reporter
            .record_failure(&format!("{}: {message}", self.label));
    }

    fn halt(&self, message: std::fmt::Arguments<'_>) {
        self.reporter
            .record_failure_and_halt(&format!("{}: {message}", self.label));
    }
}

/// Collect one line per path where `actual` differs from `expected`.
fn json_differences(path: &str, expected: &Value, actual: &Value, out: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            for (key, want) in expected {
                let child = format!("{path}.{key}");
                match actual.get(key) {
                    Some(got) => json_differences(&child, want, got, out),
                    None => out.push(format!("{child}: expected {want}, but it is missing")),
                }
            }
            for (key, got) in actual {
                if !expected.contains_key(key) {
                    out.push(format!("{path}.{key}: unexpected {got}"));
                }
            }
        }
        (Value::Array(expected), Value::Array(actual)) => {
            for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
                json_differences(&format!("{path}[{index}]"), want, got, out);
            }
            if expected.len() != actual.len() {
                out.push(format!(
                    "{path}: expected {} element(s), got {}",
                    expected.len(),
                    actual.len()
                ));
            }
        }
        _ if expected != actual => out.push(format!("{path}: expected {expected}, got {actual}")),
        _ => {}
    }
}
