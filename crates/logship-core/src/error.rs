//! Error taxonomy shared by every stage of the pipeline.
//!
//! | Kind                 | Type / variant                       | Policy                      |
//! |----------------------|--------------------------------------|-----------------------------|
//! | `SourceUnavailable`  | [`SourceError::Unavailable`]         | fatal, abort                |
//! | `SourceReadError`    | [`SourceError::Read`]                | fatal, abort                |
//! | `MalformedLine`      | [`RejectionReason::MalformedLine`]   | skip, count, continue       |
//! | `TransientIndexError`| [`IndexError::Transient`]            | retry, then `IndexFailed`   |
//! | `RejectedByStore`    | [`IndexError::RejectedByStore`]      | `IndexFailed`, no retry     |
//! | `SinkUnavailable`    | [`IndexError::SinkUnavailable`]      | fatal, abort                |

use thiserror::Error;

/// Failures of the distributed filesystem side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The path could not be opened or the remote was unreachable.
    #[error("source unavailable: {path}: {message}")]
    Unavailable { path: String, message: String },
    /// The stream broke after it was opened.
    #[error("read error on {path}: {message}")]
    Read { path: String, message: String },
}

/// Why a line was not turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("malformed line ({0})")]
    MalformedLine(Malformed),
}

/// Detail carried by [`RejectionReason::MalformedLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The line does not have the `<ip> - - [<ts>] "<req>" <status> <size>` shape.
    PatternMismatch,
    StatusOutOfRange,
    SizeOutOfRange,
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::PatternMismatch => write!(f, "does not match access log pattern"),
            Malformed::StatusOutOfRange => write!(f, "status out of range"),
            Malformed::SizeOutOfRange => write!(f, "size out of range"),
        }
    }
}

/// Failures of the document store side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Connection refused, timeout, throttling or a 5xx answer.
    #[error("transient index error: {message}")]
    Transient { message: String },
    /// The store refused the document itself. `status` is `None` when the
    /// request never reached the store.
    #[error("rejected by store: {reason}")]
    RejectedByStore { status: Option<u16>, reason: String },
    /// No connection to the store could be established at all.
    #[error("sink unavailable: {endpoint}: {message}")]
    SinkUnavailable { endpoint: String, message: String },
}

impl IndexError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, IndexError::Transient { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, IndexError::SinkUnavailable { .. })
    }
}

/// Why a run ended in the `Aborted` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] IndexError),
}

/// Settings could not be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
