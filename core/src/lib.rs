//! In-process HTTP handler testing.
//!
//! # Overview
//! Build a request, dispatch it straight into a handler (no socket, no
//! server), and check the captured response with chained assertions that
//! report into a caller-supplied `FailureReporter`.
//!
//! ```
//! use htest::{Harness, HttpRequest, ResponseRecorder, TestReporter};
//!
//! let t = TestReporter::new();
//! let test = Harness::new(&t, |req: &HttpRequest, res: &mut ResponseRecorder| {
//!     if req.path == "/admin" {
//!         res.set_header("foo", "bar");
//!         res.write_status(401);
//!         res.write_str("You are not authorized");
//!     } else {
//!         res.write_status(404);
//!     }
//! });
//!
//! test.get("/admin")
//!     .dispatch()
//!     .expect_header("foo", "bar")
//!     .expect_status(401)
//!     .expect_body("You are not authorized");
//! test.get("/unknown").dispatch().expect_status(404);
//! ```
//!
//! # Design
//! - `Harness` binds a reporter and a handler; it keeps no per-request state.
//! - `RequestBuilder` is consumed by `dispatch`, so a sent request cannot be
//!   modified.
//! - `dispatch` never fails: handler errors become reported failures and a
//!   500 result.
//! - `AssertionChain` methods return the chain, and a mismatch never stops
//!   the chain.
//! - `Handler` is the only seam to the code under test. Closures implement
//!   it, and `ServiceHandler` wraps any tower `Service`, an axum `Router`
//!   included.

pub mod assertions;
pub mod builder;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod harness;
pub mod http;
pub mod recorder;
pub mod reporter;

pub use assertions::AssertionChain;
pub use builder::RequestBuilder;
pub use dispatch::dispatch;
pub use error::HandlerError;
pub use handler::{Handler, ServiceHandler};
pub use harness::Harness;
pub use crate::http::{Headers, HttpRequest, Method};
pub use recorder::{ExecutionResult, ResponseRecorder};
pub use reporter::{Failure, FailureReporter, RecordingReporter, TestReporter};
