//! The handler capability the dispatcher drives.
//!
//! # Design
//! `Handler` is the only thing dispatch knows about: take a request, write a
//! response. Plain closures implement it directly. `ServiceHandler` adapts
//! any tower `Service` (an axum `Router`, a middleware stack, a
//! `service_fn`) by converting to and from `http` types and driving the
//! service to completion on a private current-thread runtime.

use std::fmt;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use tower::{Service, ServiceExt};

use crate::error::HandlerError;
use crate::http::HttpRequest;
use crate::recorder::ResponseRecorder;

/// Something that turns a request into a response.
pub trait Handler {
    fn serve(
        &self,
        request: &HttpRequest,
        response: &mut ResponseRecorder,
    ) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&HttpRequest, &mut ResponseRecorder),
{
    fn serve(
        &self,
        request: &HttpRequest,
        response: &mut ResponseRecorder,
    ) -> Result<(), HandlerError> {
        self(request, response);
        Ok(())
    }
}

/// Runs a tower `Service` as a `Handler`.
///
/// Each call clones the service and sends it one request with `oneshot`.
/// When called from inside a tokio runtime (for example a `#[tokio::test]`),
/// the service runs on a scoped helper thread with its own runtime, since
/// runtimes cannot be nested. Panics in the service are re-raised on the
/// calling thread.
#[derive(Debug, Clone)]
pub struct ServiceHandler<S> {
    service: S,
}

impl<S> ServiceHandler<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn into_inner(self) -> S {
        self.service
    }
}

impl<S, B> Handler for ServiceHandler<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone + Send,
    S::Error: fmt::Display,
    B: http_body::Body,
    B::Error: fmt::Display,
{
    fn serve(
        &self,
        request: &HttpRequest,
        response: &mut ResponseRecorder,
    ) -> Result<(), HandlerError> {
        let http_request = to_http_request(request)?;
        let service = self.service.clone();

        let captured = if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                scope
                    .spawn(move || call(service, http_request))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })?
        } else {
            call(service, http_request)?
        };

        captured.write_into(response);
        Ok(())
    }
}

/// Response parts copied out of the service, free of body and runtime types.
struct Captured {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Captured {
    fn write_into(self, response: &mut ResponseRecorder) {
        response.write_status(self.status);
        for (name, value) in self.headers {
            response.append_header(name, value);
        }
        response.write(&self.body);
    }
}

fn to_http_request(request: &HttpRequest) -> Result<Request<Full<Bytes>>, HandlerError> {
    let mut builder = Request::builder()
        .method(request.method.as_str())
        .uri(request.path.as_str());
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    if request.body.is_some() && !request.headers.contains("content-length") {
        builder = builder.header(http::header::CONTENT_LENGTH, request.body_bytes().len());
    }
    let body = Full::new(Bytes::copy_from_slice(request.body_bytes()));
    Ok(builder.body(body)?)
}

fn call<S, B>(service: S, request: Request<Full<Bytes>>) -> Result<Captured, HandlerError>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>>,
    S::Error: fmt::Display,
    B: http_body::Body,
    B::Error: fmt::Display,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let response = service
            .oneshot(request)
            .await
            .map_err(|err| HandlerError::Service(err.to_string()))?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|err| HandlerError::Body(err.to_string()))?
            .to_bytes();

        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(Captured {
            status: parts.status.as_u16(),
            headers,
            body,
        })
    })
}
