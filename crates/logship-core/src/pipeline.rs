//! Pipeline — drives one file through parse → build → index.
//!
//! ```text
//! Idle ─► Opening ─► Streaming ─┬─► Parsing ─► Building ─► Indexing ─┐
//!                               │◄──────────────────────────────────┘
//!                               └─► Draining ─► Closed
//!
//! Opening / Streaming / Indexing ──(fatal fault)──► Aborted
//! ```
//!
//! Lines are processed strictly one at a time: a line is fully parsed,
//! built and delivered (retries included) before the next one is read, so
//! outcomes come out in input order and at most one record is in flight.
//!
//! `SourceUnavailable`, `SourceReadError` and `SinkUnavailable` abort the
//! run. Malformed lines and failed deliveries are counted and reported, and
//! the run carries on. Every connection the run opened is closed before
//! [`Pipeline::run`] returns, whatever the terminal state.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::DocumentIds;
use crate::document;
use crate::error::AbortReason;
use crate::parser;
use crate::report::{Reporter, RunReport, Terminal};
use crate::sink::{DocumentStore, IndexSink, RetryPolicy};
use crate::source::{FileSystem, LineSource};
use crate::types::{Outcome, RawLine, Tally};

/// Where the pipeline currently is. Logged at `trace` on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Opening,
    Streaming,
    Parsing,
    Building,
    Indexing,
    Draining,
    Closed,
    Aborted,
}

/// What one run reads and how it names documents.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub path: String,
    pub document_ids: DocumentIds,
    pub retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            document_ids: DocumentIds::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            path: settings.source.path.clone(),
            document_ids: settings.sink.document_ids,
            retry: RetryPolicy::from(&settings.retry),
        }
    }
}

/// The ingestion orchestrator. Both clients are owned for the length of
/// one run.
pub struct Pipeline<F, S, R> {
    fs: F,
    sink: IndexSink<S>,
    reporter: R,
    settings: PipelineSettings,
    cancel: CancellationToken,
    state: PipelineState,
    tally: Tally,
}

impl<F, S, R> Pipeline<F, S, R>
where
    F: FileSystem,
    S: DocumentStore,
    R: Reporter,
{
    pub fn new(fs: F, store: S, reporter: R, settings: PipelineSettings) -> Self {
        let sink = IndexSink::new(store, settings.retry);
        Self {
            fs,
            sink,
            reporter,
            settings,
            cancel: CancellationToken::new(),
            state: PipelineState::Idle,
            tally: Tally::default(),
        }
    }

    /// Stop between lines once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run to a terminal state and report.
    pub async fn run(mut self) -> RunReport {
        let started_at = Utc::now();
        info!(path = %self.settings.path, "starting ingestion");

        let mut lines_read = 0;
        let mut cancelled = false;
        let result = self.execute(&mut lines_read, &mut cancelled).await;

        let terminal = match &result {
            Ok(()) => {
                self.transition(PipelineState::Closed);
                Terminal::Closed
            }
            Err(reason) => {
                self.transition(PipelineState::Aborted);
                warn!(error = %reason, "ingestion aborted");
                Terminal::Aborted
            }
        };

        let report = RunReport {
            terminal,
            tally: self.tally,
            abort: result.err(),
            cancelled,
            lines_read,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            indexed = report.tally.indexed,
            rejected = report.tally.rejected,
            failed = report.tally.failed,
            lines_read,
            terminal = ?report.terminal,
            "ingestion finished"
        );
        self.reporter.finish(&report);
        report
    }

    async fn execute(&mut self, lines_read: &mut u64, cancelled: &mut bool) -> Result<(), AbortReason> {
        self.transition(PipelineState::Opening);
        let mut source = LineSource::open(&mut self.fs, &self.settings.path).await?;

        if let Err(err) = self.sink.connect().await {
            source.close().await;
            return Err(err.into());
        }

        self.transition(PipelineState::Streaming);
        let result = self.stream(&mut source, cancelled).await;

        self.transition(PipelineState::Draining);
        *lines_read = source.lines_read();
        self.sink.close().await;
        source.close().await;
        debug!(
            lines_read = source.lines_read(),
            blank_lines = source.blank_lines(),
            "connections closed"
        );
        result
    }

    async fn stream(
        &mut self,
        source: &mut LineSource<F::Reader>,
        cancelled: &mut bool,
    ) -> Result<(), AbortReason> {
        loop {
            if self.cancel.is_cancelled() {
                info!(lines_read = source.lines_read(), "cancelled; stopping before next line");
                *cancelled = true;
                return Ok(());
            }

            let Some(line) = source.next().await? else {
                debug!("end of stream");
                return Ok(());
            };

            let outcome = self.process(line).await?;
            self.tally.record(&outcome);
            self.reporter.record(&outcome);
            self.transition(PipelineState::Streaming);
        }
    }

    /// Take one line through every stage. Only fatal sink faults escape.
    async fn process(&mut self, line: RawLine) -> Result<Outcome, AbortReason> {
        self.transition(PipelineState::Parsing);
        let record = match parser::parse(&line) {
            Ok(record) => record,
            Err(reason) => {
                warn!(ordinal = line.ordinal, %reason, line = %line.text, "line rejected");
                return Ok(Outcome::Rejected { line, reason });
            }
        };

        self.transition(PipelineState::Building);
        let document = document::build(record);

        self.transition(PipelineState::Indexing);
        let id = match self.settings.document_ids {
            DocumentIds::Store => None,
            DocumentIds::Deterministic => Some(document::document_id(
                &self.settings.path,
                line.ordinal,
                &document,
            )),
        };

        match self.sink.submit(&document, id.as_deref()).await {
            Ok(ack) => Ok(Outcome::Indexed {
                ordinal: line.ordinal,
                document,
                ack,
            }),
            Err(err) if err.is_fatal() => Err(err.into()),
            Err(error) => {
                warn!(ordinal = line.ordinal, %error, "document not indexed");
                Ok(Outcome::IndexFailed {
                    ordinal: line.ordinal,
                    document,
                    error,
                })
            }
        }
    }

    fn transition(&mut self, next: PipelineState) {
        trace!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}

impl<F, S, R> std::fmt::Debug for Pipeline<F, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("tally", &self.tally)
            .finish_non_exhaustive()
    }
}
