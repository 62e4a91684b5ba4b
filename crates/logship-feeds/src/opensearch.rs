//! OpenSearch document store over the REST API.
//!
//! `connect` probes `GET /`; `index` makes one `POST /<index>/_doc` (or
//! `PUT /<index>/_doc/<id>` when the caller supplies an id) carrying the
//! configured `refresh` mode. Retrying is the caller's business: every
//! answer is classified once.
//!
//! | Answer                               | Result                   |
//! |--------------------------------------|--------------------------|
//! | 2xx                                  | `Ack::Id` / `Ack::Accepted` |
//! | 429, 5xx, timeout, connection error  | `Transient`              |
//! | other 4xx                            | `RejectedByStore`        |

use std::time::Duration;

use hyper::body::Bytes;
use hyper::{Method, StatusCode};
use logship_core::config::{RefreshMode, SinkSettings};
use logship_core::sink::DocumentStore;
use logship_core::{Ack, Document, IndexError};
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::{self, HttpClient, HttpError};

#[derive(Debug, Default, Deserialize)]
struct ClusterInfo {
    #[serde(default)]
    cluster_name: String,
    #[serde(default)]
    version: ClusterVersion,
}

#[derive(Debug, Default, Deserialize)]
struct ClusterVersion {
    #[serde(default)]
    number: String,
    #[serde(default)]
    distribution: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexResponse {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

/// Client for one index on one cluster.
#[derive(Debug, Clone)]
pub struct OpenSearch {
    client: HttpClient,
    url: String,
    index: String,
    refresh: RefreshMode,
    timeout: Duration,
}

impl OpenSearch {
    pub fn new(url: &str, index: impl Into<String>) -> Self {
        Self {
            client: http::client(),
            url: http::trim_base(url),
            index: index.into(),
            refresh: RefreshMode::default(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_settings(settings: &SinkSettings) -> Self {
        Self::new(&settings.url, settings.index.clone())
            .with_refresh(settings.refresh)
            .with_timeout(settings.timeout())
    }

    pub fn with_refresh(mut self, refresh: RefreshMode) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn document_url(&self, id: Option<&str>) -> (Method, String) {
        let refresh = self.refresh.as_query_value();
        match id {
            Some(id) => (
                Method::PUT,
                format!("{}/{}/_doc/{}?refresh={}", self.url, self.index, id, refresh),
            ),
            None => (
                Method::POST,
                format!("{}/{}/_doc?refresh={}", self.url, self.index, refresh),
            ),
        }
    }

    fn sink_unavailable(&self, message: impl Into<String>) -> IndexError {
        IndexError::SinkUnavailable {
            endpoint: self.url.clone(),
            message: message.into(),
        }
    }
}

impl DocumentStore for OpenSearch {
    async fn connect(&mut self) -> Result<(), IndexError> {
        let url = format!("{}/", self.url);
        let response = http::send(&self.client, Method::GET, &url, None, self.timeout)
            .await
            .map_err(|err| self.sink_unavailable(err.to_string()))?;
        let status = response.status();
        let body = http::read_body(response, self.timeout)
            .await
            .map_err(|err| self.sink_unavailable(err.to_string()))?;

        if !status.is_success() {
            return Err(self.sink_unavailable(format!("cluster probe answered {status}")));
        }

        let cluster: ClusterInfo = serde_json::from_slice(&body).unwrap_or_default();
        info!(
            url = %self.url,
            index = %self.index,
            cluster = %cluster.cluster_name,
            version = %cluster.version.number,
            distribution = cluster.version.distribution.as_deref().unwrap_or("elasticsearch"),
            "document store reachable"
        );
        Ok(())
    }

    async fn index(&mut self, document: &Document, id: Option<&str>) -> Result<Ack, IndexError> {
        let payload = serde_json::to_vec(document).map_err(|err| IndexError::RejectedByStore {
            status: None,
            reason: format!("document could not be encoded: {err}"),
        })?;
        let (method, url) = self.document_url(id);

        let response = http::send(&self.client, method, &url, Some(Bytes::from(payload)), self.timeout)
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = http::read_body(response, self.timeout)
            .await
            .map_err(request_error)?;

        classify(status, &body)
    }

    async fn close(&mut self) {
        // Dropping the client drops its pooled keep-alive connections.
        self.client = http::client();
        debug!(url = %self.url, "document store connection pool released");
    }
}

fn request_error(err: HttpError) -> IndexError {
    match err {
        HttpError::InvalidRequest(reason) => IndexError::RejectedByStore {
            status: None,
            reason,
        },
        other => IndexError::Transient {
            message: other.to_string(),
        },
    }
}

/// Map one store answer onto the error taxonomy.
fn classify(status: StatusCode, body: &[u8]) -> Result<Ack, IndexError> {
    if status.is_success() {
        let response: IndexResponse = serde_json::from_slice(body).unwrap_or_default();
        debug!(%status, result = response.result.as_deref().unwrap_or("-"), "store answered");
        return Ok(response.id.map(Ack::Id).unwrap_or(Ack::Accepted));
    }

    let reason = error_reason(body).unwrap_or_else(|| status.to_string());
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Err(IndexError::Transient {
            message: format!("{status}: {reason}"),
        })
    } else {
        Err(IndexError::RejectedByStore {
            status: Some(status.as_u16()),
            reason,
        })
    }
}

/// `error.type: error.reason` from an OpenSearch error body.
fn error_reason(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(reason) => Some(reason.clone()),
        error => {
            let reason = error.get("reason").and_then(|r| r.as_str())?;
            match error.get("type").and_then(|t| t.as_str()) {
                Some(kind) => Some(format!("{kind}: {reason}")),
                None => Some(reason.to_string()),
            }
        }
    }
}
