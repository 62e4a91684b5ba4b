//! WebHDFS file system — reads HDFS files over the NameNode's REST gateway.
//!
//! Opening a file is two requests: a `LISTSTATUS` of the parent directory,
//! which proves the NameNode is reachable and logs what is there, then
//! `OPEN`, which the NameNode answers with a redirect to a DataNode. The
//! DataNode response body is consumed one frame at a time and split on
//! `\n`, so memory stays bounded by the largest frame plus one line.

use std::time::Duration;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{header, Method, Uri};
use logship_core::config::SourceSettings;
use logship_core::source::{FileSystem, LineReader};
use logship_core::SourceError;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::{self, HttpClient, HttpError};

/// NameNode → DataNode is one hop; leave room for a proxy in front.
const MAX_REDIRECTS: usize = 3;

/// Escaped inside an HDFS path; `/` separates segments and stays.
const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escaped inside a query value.
const QUERY_SET: &AsciiSet = &PATH_SET.add(b'&').add(b'=').add(b'+').add(b'/');

/// One entry of a `LISTSTATUS` answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub path_suffix: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub length: u64,
}

#[derive(Debug, Deserialize)]
struct ListStatusResponse {
    #[serde(rename = "FileStatuses")]
    file_statuses: FileStatuses,
}

#[derive(Debug, Deserialize)]
struct FileStatuses {
    #[serde(rename = "FileStatus", default)]
    file_status: Vec<FileStatus>,
}

/// WebHDFS client bound to one NameNode and user.
#[derive(Debug, Clone)]
pub struct WebHdfs {
    client: HttpClient,
    namenode_url: String,
    user: String,
    timeout: Duration,
}

impl WebHdfs {
    pub fn new(namenode_url: &str, user: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http::client(),
            namenode_url: http::trim_base(namenode_url),
            user: user.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &SourceSettings) -> Self {
        Self::new(&settings.namenode_url, settings.user.clone(), settings.timeout())
    }

    fn op_url(&self, path: &str, op: &str) -> String {
        format!(
            "{}/webhdfs/v1{}?op={}&user.name={}",
            self.namenode_url,
            utf8_percent_encode(&absolute(path), PATH_SET),
            op,
            utf8_percent_encode(&self.user, QUERY_SET)
        )
    }

    /// List a directory.
    pub async fn list_status(&self, dir: &str) -> Result<Vec<FileStatus>, SourceError> {
        let url = self.op_url(dir, "LISTSTATUS");
        let response = http::send(&self.client, Method::GET, &url, None, self.timeout)
            .await
            .map_err(|err| unavailable(dir, err))?;
        let status = response.status();
        let body = http::read_body(response, self.timeout)
            .await
            .map_err(|err| unavailable(dir, err))?;

        if !status.is_success() {
            return Err(SourceError::Unavailable {
                path: dir.to_string(),
                message: remote_exception(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        serde_json::from_slice::<ListStatusResponse>(&body)
            .map(|listing| listing.file_statuses.file_status)
            .map_err(|err| SourceError::Unavailable {
                path: dir.to_string(),
                message: format!("unexpected LISTSTATUS answer: {err}"),
            })
    }
}

impl FileSystem for WebHdfs {
    type Reader = WebHdfsReader;

    async fn open(&mut self, path: &str) -> Result<WebHdfsReader, SourceError> {
        let dir = parent_dir(path);
        let listing = self.list_status(dir).await?;
        let names: Vec<&str> = listing.iter().map(|f| f.path_suffix.as_str()).collect();
        info!(namenode = %self.namenode_url, dir, files = ?names, "namenode reachable");

        let mut url = self.op_url(path, "OPEN");
        for hop in 0..=MAX_REDIRECTS {
            let response = http::send(&self.client, Method::GET, &url, None, self.timeout)
                .await
                .map_err(|err| unavailable(path, err))?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| SourceError::Unavailable {
                        path: path.to_string(),
                        message: format!("{status} without a Location header"),
                    })?;
                url = resolve_location(&url, location);
                debug!(hop, %url, "following redirect");
                continue;
            }

            if !status.is_success() {
                let body = http::read_body(response, self.timeout)
                    .await
                    .unwrap_or_default();
                return Err(SourceError::Unavailable {
                    path: path.to_string(),
                    message: remote_exception(&body).unwrap_or_else(|| status.to_string()),
                });
            }

            info!(path, "streaming file");
            return Ok(WebHdfsReader::new(path, response.into_body(), self.timeout));
        }

        Err(SourceError::Unavailable {
            path: path.to_string(),
            message: format!("more than {MAX_REDIRECTS} redirects"),
        })
    }
}

/// Line stream over a WebHDFS `OPEN` response body.
#[derive(Debug)]
pub struct WebHdfsReader {
    path: String,
    body: Option<Incoming>,
    pending: Vec<u8>,
    /// Start of the unconsumed part of `pending`.
    cursor: usize,
    timeout: Duration,
}

impl WebHdfsReader {
    fn new(path: &str, body: Incoming, timeout: Duration) -> Self {
        Self {
            path: path.to_string(),
            body: Some(body),
            pending: Vec::new(),
            cursor: 0,
            timeout,
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let offset = self.pending[self.cursor..].iter().position(|b| *b == b'\n')?;
        let end = self.cursor + offset;
        let line = self.pending[self.cursor..end].to_vec();
        self.cursor = end + 1;
        Some(line)
    }

    fn take_rest(&mut self) -> Option<Vec<u8>> {
        if self.cursor >= self.pending.len() {
            return None;
        }
        let rest = self.pending[self.cursor..].to_vec();
        self.pending.clear();
        self.cursor = 0;
        Some(rest)
    }

    fn append(&mut self, data: &[u8]) {
        if self.cursor > 0 {
            self.pending.drain(..self.cursor);
            self.cursor = 0;
        }
        self.pending.extend_from_slice(data);
    }

    fn read_error(&self, message: impl Into<String>) -> SourceError {
        SourceError::Read {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<String, SourceError> {
        String::from_utf8(bytes).map_err(|err| self.read_error(format!("invalid UTF-8: {err}")))
    }
}

impl LineReader for WebHdfsReader {
    async fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        loop {
            if let Some(line) = self.take_line() {
                return self.decode(line).map(Some);
            }

            let Some(body) = self.body.as_mut() else {
                return match self.take_rest() {
                    Some(rest) => self.decode(rest).map(Some),
                    None => Ok(None),
                };
            };

            match tokio::time::timeout(self.timeout, body.frame()).await {
                Err(_) => return Err(self.read_error(format!("no data for {:?}", self.timeout))),
                Ok(None) => self.body = None,
                Ok(Some(Err(err))) => return Err(self.read_error(http::error_chain(&err))),
                Ok(Some(Ok(frame))) => {
                    if let Ok(data) = frame.into_data() {
                        self.append(&data);
                    }
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.body.take().is_some() {
            debug!(path = %self.path, "closing stream before end of file");
        }
        self.pending.clear();
        self.cursor = 0;
    }
}

fn unavailable(path: &str, err: HttpError) -> SourceError {
    SourceError::Unavailable {
        path: path.to_string(),
        message: err.to_string(),
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Parent directory of an HDFS path; `/` for top-level entries.
pub fn parent_dir(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(current: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        return location.to_string();
    }
    match current.parse::<Uri>() {
        Ok(uri) => format!(
            "{}://{}{}",
            uri.scheme_str().unwrap_or("http"),
            uri.authority().map(|a| a.as_str()).unwrap_or_default(),
            absolute(location)
        ),
        Err(_) => location.to_string(),
    }
}

/// `RemoteException.message` from a WebHDFS error body.
fn remote_exception(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let exception = value.get("RemoteException")?;
    let message = exception.get("message")?.as_str()?;
    match exception.get("exception").and_then(|e| e.as_str()) {
        Some(kind) => Some(format!("{kind}: {message}")),
        None => Some(message.to_string()),
    }
}
