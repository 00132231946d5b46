//! Sample endpoints used to exercise the `htest` harness.
//!
//! # Design
//! A plain axum `Router` with one route per scenario: custom headers,
//! cookies, JSON in both directions, non-200 statuses, and an echo endpoint
//! that reflects what the client sent. Unmatched paths fall through to the
//! router's 404. `run` serves the same router over TCP for manual testing.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// The only password `/auth` accepts.
pub const PASSWORD: &str = "pass";

/// Login payload for `/auth`, also served verbatim by `/json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub mail: String,
    pub password: String,
}

impl Credentials {
    pub fn new(mail: &str, password: &str) -> Self {
        Self {
            mail: mail.to_string(),
            password: password.to_string(),
        }
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/path", any(path))
        .route("/cookie", get(cookie))
        .route("/json", get(json))
        .route("/auth", post(auth))
        .route("/admin", get(admin))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    tracing::info!(addr = ?listener.local_addr().ok(), "serving sample endpoints");
    axum::serve(listener, app()).await
}

async fn path(method: Method) -> impl IntoResponse {
    if method == Method::POST {
        ([("foo", "bar")], "Response").into_response()
    } else {
        StatusCode::OK.into_response()
    }
}

async fn cookie() -> impl IntoResponse {
    ([(header::SET_COOKIE, "batman=htest")], StatusCode::OK)
}

async fn json() -> Json<Credentials> {
    Json(Credentials::new("test@test.com", PASSWORD))
}

async fn auth(Json(input): Json<Credentials>) -> (StatusCode, &'static str) {
    let status = if input.password == PASSWORD {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, status.canonical_reason().unwrap_or_default())
}

async fn admin() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        [("foo", "bar")],
        "You are not authorized",
    )
}

async fn echo(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let mut response = body.into_response();
    if let Some(foo) = headers.get("foo") {
        response.headers_mut().insert("foo", foo.clone());
    }
    response
}
