//! Failure sinks that assertions report into.
//!
//! # Design
//! The harness never panics on a mismatch by itself. It hands a message to
//! a `FailureReporter` injected at construction and keeps going, so one
//! dispatch can surface several independent mismatches. Whether and when a
//! test actually fails is the reporter's decision.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A sink that records failures for the current test.
pub trait FailureReporter {
    /// Mark the test as failed and let it continue.
    fn record_failure(&self, message: &str);

    /// Mark the test as failed and stop it, if the reporter can.
    ///
    /// Reporters that cannot halt fall back to `record_failure`; callers
    /// must not rely on this call diverging.
    fn record_failure_and_halt(&self, message: &str) {
        self.record_failure(message);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reporter for plain `#[test]` functions.
///
/// Failures accumulate while the test runs and are raised together as one
/// panic when the reporter is dropped. `record_failure_and_halt` panics
/// straight away.
///
/// ```should_panic
/// # use htest::FailureReporter;
/// let t = htest::TestReporter::new();
/// t.record_failure("expected status 200, got 404");
/// // panics here, when `t` goes out of scope
/// ```
#[derive(Debug, Default)]
pub struct TestReporter {
    failures: Mutex<Vec<String>>,
}

impl TestReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<String> {
        lock(&self.failures).clone()
    }

    pub fn failed(&self) -> bool {
        !lock(&self.failures).is_empty()
    }
}

impl FailureReporter for TestReporter {
    fn record_failure(&self, message: &str) {
        tracing::warn!("{message}");
        lock(&self.failures).push(message.to_string());
    }

    fn record_failure_and_halt(&self, message: &str) {
        self.record_failure(message);
        let failures = std::mem::take(&mut *lock(&self.failures));
        panic!("{}", failures.join("\n"));
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        let failures = std::mem::take(&mut *lock(&self.failures));
        if failures.is_empty() || std::thread::panicking() {
            return;
        }
        panic!(
            "{} assertion(s) failed:\n{}",
            failures.len(),
            failures.join("\n")
        );
    }
}

/// One failure captured by `RecordingReporter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    /// Whether the failure asked to halt the test.
    pub halted: bool,
}

/// Reporter that only collects failures, for callers that want to inspect
/// them instead of failing the test.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<Failure>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        lock(&self.failures).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.failures)
            .iter()
            .map(|failure| failure.message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.failures).is_empty()
    }

    pub fn len(&self) -> usize {
        lock(&self.failures).len()
    }

    fn push(&self, message: &str, halted: bool) {
        lock(&self.failures).push(Failure {
            message: message.to_string(),
            halted,
        });
    }
}

impl FailureReporter for RecordingReporter {
    fn record_failure(&self, message: &str) {
        self.push(message, false);
    }

    fn record_failure_and_halt(&self, message: &str) {
        self.push(message, true);
    }
}
