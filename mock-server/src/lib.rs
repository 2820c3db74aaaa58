//! Upstream fixture for playground integration tests.
//!
//! Each route produces one response shape the playground has to render:
//! an echo of the request, a pair of `Set-Cookie` headers, a plain-text 404,
//! a response without a body, a compact XML document and a binary image.

use std::collections::BTreeMap;

use axum::{
    extract::Query,
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Session cookie set by `GET /cookies`.
pub const SESSION_COOKIE: &str = "session=abc%20123; Path=/; HttpOnly; Secure";
/// Preference cookie set by `GET /cookies`.
pub const THEME_COOKIE: &str = "theme=\"dark\"; Domain=localhost; Expires=Wed, 21 Oct 2037 07:28:00 GMT";

/// Body of `GET /report`, served as `application/xml` without whitespace.
pub const REPORT_XML: &str = "<report><item>a</item><item>b</item></report>";

/// What `/echo` saw of the request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    /// Request headers with lowercase names, minus transport headers.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/cookies", get(cookies))
        .route("/missing", get(missing))
        .route("/empty", get(empty))
        .route("/report", get(report))
        .route("/logo", get(logo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock upstream listening");
    }
    axum::serve(listener, app()).await
}

const TRANSPORT_HEADERS: [&str; 5] = ["host", "content-length", "connection", "accept-encoding", "user-agent"];

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    tracing::debug!(%method, params = query.len(), "echo");
    let headers = headers
        .iter()
        .filter(|(name, _)| !TRANSPORT_HEADERS.contains(&name.as_str()))
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body,
    })
}

async fn cookies() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, SESSION_COOKIE), (header::SET_COOKIE, THEME_COOKIE)]),
        "cookies set",
    )
}

async fn missing() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Nope")
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn report() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], REPORT_XML)
}

async fn logo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], &b"\x89PNG\r\n"[..])
}
