//! Core types for logship-core.
//!
//! This module defines the value objects that flow once through the
//! pipeline: the [`RawLine`] read from the source, the [`ParsedRecord`]
//! produced by the parser, the wire-ready [`Document`], the store's [`Ack`],
//! and the per-line [`Outcome`]. None of them is mutated after construction.

use serde::Serialize;

use crate::error::{IndexError, RejectionReason};

/// Placeholder used for `method` and `url` when the request field does not
/// carry them.
pub const UNKNOWN: &str = "UNKNOWN";

/// One non-blank line of the source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based physical line number. Skipped blank lines still consume a number.
    pub ordinal: u64,
    /// Line text with surrounding whitespace removed.
    pub text: String,
}

impl RawLine {
    pub fn new(ordinal: u64, text: impl Into<String>) -> Self {
        Self {
            ordinal,
            text: text.into(),
        }
    }
}

/// A successfully parsed access log line.
///
/// Every field is present even when the request field was incomplete; the
/// parser substitutes [`UNKNOWN`] rather than leaving gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub client_ip: String,
    /// Timestamp exactly as it appeared between the brackets.
    pub raw_timestamp: String,
    pub method: String,
    pub url: String,
    pub status: u64,
    pub size: u64,
    /// The source line, kept verbatim for audit.
    pub original_log: String,
}

/// The representation submitted to the document store.
///
/// Field order here is the order the store receives them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub client_ip: String,
    pub raw_timestamp: String,
    pub method: String,
    pub url: String,
    pub status: u64,
    pub size: u64,
    pub original_log: String,
}

/// Store acknowledgement for an indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// The store reported the id it indexed the document under.
    Id(String),
    /// The store acknowledged the write without an id.
    Accepted,
}

impl std::fmt::Display for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ack::Id(id) => write!(f, "{id}"),
            Ack::Accepted => write!(f, "accepted"),
        }
    }
}

/// What happened to a single source line.
#[derive(Debug, Clone)]
pub enum Outcome {
    Indexed {
        ordinal: u64,
        document: Document,
        ack: Ack,
    },
    Rejected {
        line: RawLine,
        reason: RejectionReason,
    },
    IndexFailed {
        ordinal: u64,
        document: Document,
        error: IndexError,
    },
}

impl Outcome {
    /// Line number the outcome refers to.
    pub fn ordinal(&self) -> u64 {
        match self {
            Outcome::Indexed { ordinal, .. } | Outcome::IndexFailed { ordinal, .. } => *ordinal,
            Outcome::Rejected { line, .. } => line.ordinal,
        }
    }
}

/// Per-run outcome counters. Only the orchestrator updates them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub indexed: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl Tally {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Indexed { .. } => self.indexed += 1,
            Outcome::Rejected { .. } => self.rejected += 1,
            Outcome::IndexFailed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.indexed + self.rejected + self.failed
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "indexed={} rejected={} failed={}",
            self.indexed, self.rejected, self.failed
        )
    }
}
