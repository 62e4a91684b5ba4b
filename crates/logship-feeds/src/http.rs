//! Shared hyper plumbing for the WebHDFS and OpenSearch clients.
//!
//! Plain `http://` only; TLS and authentication are out of scope for the
//! two clusters this talks to.

use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

pub(crate) type HttpClient = Client<HttpConnector, Full<Bytes>>;

pub(crate) fn client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build_http()
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Send one request, bounded by `timeout` until the response head arrives.
pub(crate) async fn send(
    client: &HttpClient,
    method: Method,
    uri: &str,
    json_body: Option<Bytes>,
    timeout: Duration,
) -> Result<Response<Incoming>, HttpError> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match json_body {
        Some(bytes) => {
            builder = builder.header(hyper::header::CONTENT_TYPE, "application/json");
            Full::new(bytes)
        }
        None => Full::new(Bytes::new()),
    };
    let request = builder
        .body(body)
        .map_err(|err| HttpError::InvalidRequest(err.to_string()))?;

    match tokio::time::timeout(timeout, client.request(request)).await {
        Err(_) => Err(HttpError::Timeout(timeout)),
        Ok(Err(err)) if err.is_connect() => Err(HttpError::Connect(error_chain(&err))),
        Ok(Err(err)) => Err(HttpError::Transport(error_chain(&err))),
        Ok(Ok(response)) => Ok(response),
    }
}

/// Collect a whole (small) response body.
pub(crate) async fn read_body(
    response: Response<Incoming>,
    timeout: Duration,
) -> Result<Bytes, HttpError> {
    match tokio::time::timeout(timeout, response.into_body().collect()).await {
        Err(_) => Err(HttpError::Timeout(timeout)),
        Ok(Err(err)) => Err(HttpError::Transport(error_chain(&err))),
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
    }
}

/// `base` without trailing slashes, so paths can be appended with `/`.
pub(crate) fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Render an error with its whole `source()` chain; hyper's top-level
/// messages alone ("client error (Connect)") say little.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
