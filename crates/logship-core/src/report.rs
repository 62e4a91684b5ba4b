//! Run reports and the [`Reporter`] seam that presents them.
//!
//! The pipeline never prints. It hands every [`Outcome`] to a [`Reporter`]
//! as it happens and the final [`RunReport`] once at the end.

use chrono::{DateTime, Utc};

use crate::error::AbortReason;
use crate::types::{Outcome, Tally};

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The source reached end of stream (or the run was cancelled and drained).
    Closed,
    /// A fatal external fault stopped the run.
    Aborted,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub terminal: Terminal,
    pub tally: Tally,
    /// Set exactly when `terminal` is [`Terminal::Aborted`].
    pub abort: Option<AbortReason>,
    pub cancelled: bool,
    /// Physical lines read, blank ones included.
    pub lines_read: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.terminal == Terminal::Closed
    }

    /// Process exit status for this run: 0 closed, 1 aborted, 130 cancelled.
    pub fn exit_code(&self) -> u8 {
        match (self.terminal, self.cancelled) {
            (Terminal::Aborted, _) => 1,
            (Terminal::Closed, true) => 130,
            (Terminal::Closed, false) => 0,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Consumer of the per-line outcome stream.
pub trait Reporter {
    fn record(&mut self, outcome: &Outcome);

    fn finish(&mut self, _report: &RunReport) {}
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn record(&mut self, outcome: &Outcome) {
        (**self).record(outcome);
    }

    fn finish(&mut self, report: &RunReport) {
        (**self).finish(report);
    }
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn record(&mut self, _outcome: &Outcome) {}
}

/// Reporter that keeps every outcome, in order. Handy for tests and
/// embedding.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub outcomes: Vec<Outcome>,
    pub report: Option<RunReport>,
}

impl Reporter for CollectingReporter {
    fn record(&mut self, outcome: &Outcome) {
        self.outcomes.push(outcome.clone());
    }

    fn finish(&mut self, report: &RunReport) {
        self.report = Some(report.clone());
    }
}
