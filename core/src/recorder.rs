//! Response capture: what a handler writes, and the frozen result.
//!
//! # Design
//! `ResponseRecorder` plays the part of a server's response writer but
//! keeps everything in memory. Once the handler returns, `finish` freezes it
//! into an `ExecutionResult`, parsing cookies out of the `Set-Cookie`
//! headers so a cookie set through a tower service and one set through
//! `ResponseRecorder::set_cookie` land in the same place.

use std::collections::BTreeMap;

use cookie::Cookie;

use crate::http::Headers;

const DEFAULT_STATUS: u16 = 200;
const SET_COOKIE: &str = "Set-Cookie";

/// In-memory response sink handed to `Handler::serve`.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<u16>,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.append(name, value);
    }

    /// Record the status code. Only the first call counts.
    pub fn write_status(&mut self, status: u16) {
        match self.status {
            None => self.status = Some(status),
            Some(written) => {
                tracing::warn!(written, ignored = status, "superfluous status write");
            }
        }
    }

    /// Append to the body, committing a 200 status if none was written.
    pub fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(DEFAULT_STATUS);
        }
        self.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    pub fn set_cookie(&mut self, cookie: Cookie<'_>) {
        self.headers.append(SET_COOKIE, cookie.to_string());
    }

    /// Status so far; 200 when nothing was written.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(DEFAULT_STATUS)
    }

    pub(crate) fn status_written(&self) -> bool {
        self.status.is_some()
    }

    pub fn finish(self) -> ExecutionResult {
        let mut cookies = BTreeMap::new();
        for raw in self.headers.get_all(SET_COOKIE) {
            match Cookie::parse(raw) {
                Ok(cookie) => {
                    cookies.insert(cookie.name().to_string(), cookie.value().to_string());
                }
                Err(err) => tracing::warn!(%err, raw, "ignoring malformed Set-Cookie header"),
            }
        }

        ExecutionResult {
            status: self.status(),
            headers: self.headers,
            body: self.body,
            cookies,
        }
    }
}

/// Everything one dispatch produced. Read-only.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
    cookies: BTreeMap<String, String>,
}

impl ExecutionResult {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive lookup; the last value the handler set wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}
