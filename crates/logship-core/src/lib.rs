//! logship-core — access log ingestion pipeline.
//!
//! This crate holds everything that does not talk to a real network: the
//! value types, the error taxonomy, configuration, and the four pipeline
//! stages plus the orchestrator that drives them.
//!
//! # Architecture
//!
//! ```text
//! LineSource ──► LogParser ──► DocumentBuilder ──► IndexSink ──► Tally
//!     │                                               │            │
//!  FileSystem                                   DocumentStore   Reporter
//! ```
//!
//! [`FileSystem`](source::FileSystem) and [`DocumentStore`](sink::DocumentStore)
//! are the seams to the outside world; `logship-feeds` implements them for
//! WebHDFS, local files and OpenSearch.

pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod source;
pub mod types;

pub use error::{AbortReason, IndexError, Malformed, RejectionReason, SourceError};
pub use pipeline::{Pipeline, PipelineSettings, PipelineState};
pub use report::{Reporter, RunReport, Terminal};
pub use types::{Ack, Document, Outcome, ParsedRecord, RawLine, Tally, UNKNOWN};
