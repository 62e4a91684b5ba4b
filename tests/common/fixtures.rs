//! Static access log corpora used across harnesses.

use std::path::PathBuf;

/// A request line with method, URL and protocol.
pub const SCENARIO_A: &str =
    r#"192.168.1.10 - - [21/Nov/2025:10:00:00] "GET /index.html HTTP/1.1" 200 1024"#;

/// A one-token request.
pub const SCENARIO_B: &str = r#"10.0.0.5 - - [21/Nov/2025:10:00:01] "BADREQUEST" 400 0"#;

/// Not an access log line at all.
pub const SCENARIO_C: &str = "not a log line";

/// Lines the parser accepts.
pub const CORPUS_WELL_FORMED: &[&str] = &[
    SCENARIO_A,
    SCENARIO_B,
    r#"172.16.0.3 - - [21/Nov/2025:10:00:02 +0100] "POST /api/v1/orders HTTP/2.0" 201 532 "https://shop.example/cart" "Mozilla/5.0""#,
    r#"10.1.2.4 - - [21/Nov/2025:10:00:04] "" 400 0"#,
    r#"10.1.2.7 - - [21/Nov/2025:10:00:08] "DELETE /items/7" 204 0"#,
    r#"10.1.2.9 - - [21/Nov/2025:10:00:11] "HEAD /healthz HTTP/1.1" 200 0"#,
];

/// Lines the parser rejects.
pub const CORPUS_MALFORMED: &[&str] = &[
    SCENARIO_C,
    r#"10.1.2.5 - - [21/Nov/2025:10:00:05] "GET /a HTTP/1.1" - 0"#,
    r#"::1 - - [21/Nov/2025:10:00:06] "GET / HTTP/1.1" 200 12"#,
    r#"10.1.2.5 - - 21/Nov/2025:10:00:05 "GET /a HTTP/1.1" 200 0"#,
    r#"10.1.2.5 - - [21/Nov/2025:10:00:05] "GET /a HTTP/1.1" 200"#,
    r#"10.1.2.6 - - [21/Nov/2025:10:00:07] "GET /big HTTP/1.1" 200 99999999999999999999999"#,
];

/// Well-formed, blank and malformed lines interleaved. Ordinals of the
/// non-blank lines are 1, 3, 5 and 6.
pub const CORPUS_MIXED: &[&str] = &[SCENARIO_A, "", SCENARIO_C, "   ", SCENARIO_B, SCENARIO_A];

/// `tests/fixtures/golden`, the parser conformance corpus.
pub fn golden_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("golden")
}

/// Corpus lines joined into a file body, newline-terminated.
pub fn file_body(lines: &[&str]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}
