//! LogParser — turns one [`RawLine`] into a [`ParsedRecord`] or a rejection.
//!
//! Recognised shape: `<ip> - - [<timestamp>] "<request>" <status> <size>`.
//! The pattern is anchored at the start of the line only, so anything after
//! the size field (the referer and user agent of a combined log) is ignored.
//!
//! The request capture is lazy: it ends at the first `"` that lets the rest
//! of the pattern match. Escaped quotes inside the request are not treated
//! specially. `tests/parser_harness.rs` pins this behaviour with a golden
//! corpus; change the pattern only together with that corpus.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Malformed, RejectionReason};
use crate::types::{ParsedRecord, RawLine, UNKNOWN};

/// Pattern source, exposed for diagnostics and benches.
pub const ACCESS_LOG_PATTERN: &str =
    r#"^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+) - - \[(.*?)\] "(.*?)" ([0-9]+) ([0-9]+)"#;

static ACCESS_LOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ACCESS_LOG_PATTERN).expect("access log pattern must compile"));

/// Parse a single access log line.
pub fn parse(line: &RawLine) -> Result<ParsedRecord, RejectionReason> {
    let caps = ACCESS_LOG
        .captures(&line.text)
        .ok_or(RejectionReason::MalformedLine(Malformed::PatternMismatch))?;

    let (method, url) = split_request(&caps[3]);
    let status = caps[4]
        .parse::<u64>()
        .map_err(|_| RejectionReason::MalformedLine(Malformed::StatusOutOfRange))?;
    let size = caps[5]
        .parse::<u64>()
        .map_err(|_| RejectionReason::MalformedLine(Malformed::SizeOutOfRange))?;

    Ok(ParsedRecord {
        client_ip: caps[1].to_string(),
        raw_timestamp: caps[2].to_string(),
        method,
        url,
        status,
        size,
        original_log: line.text.clone(),
    })
}

/// Method and URL from a request line such as `GET /index.html HTTP/1.1`.
/// Tokens past the second are dropped.
fn split_request(request: &str) -> (String, String) {
    let mut tokens = request.split_whitespace();
    let method = tokens.next().unwrap_or(UNKNOWN).to_string();
    let url = tokens.next().unwrap_or(UNKNOWN).to_string();
    (method, url)
}
