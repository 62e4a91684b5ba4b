//! logship — ship web-server access logs from HDFS into OpenSearch.
//!
//! The binary reads one access log line by line, parses each line into a
//! record, builds a document from it and indexes that document. This crate
//! holds the binary's pieces so integration tests can drive them directly;
//! the pipeline itself lives in [`logship_core`] and the clients in
//! [`logship_feeds`].
//!
//! # Architecture
//!
//! ```text
//! WebHdfs / LocalFs ──► Pipeline (logship-core) ──► OpenSearch
//!                            │
//!                     ConsoleReporter ──► stdout
//! ```

pub mod app;
pub mod report;

pub use logship_core;
pub use logship_feeds;
pub use report::ConsoleReporter;
