//! Errors a `Handler` can return from `serve`.
//!
//! # Design
//! Dispatch itself never fails: whatever goes wrong inside a handler is
//! turned into a reported test failure plus a 500 result by the dispatcher.
//! These variants only exist so handlers can say *what* went wrong.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request could not be expressed as an `http::Request`.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// The runtime that drives an async service could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// The wrapped service returned an error instead of a response.
    #[error("service error: {0}")]
    Service(String),

    /// The response body stream failed part-way.
    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Failed(String),
}
