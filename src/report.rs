//! Console presentation of a run: one line per record on stdout, then the
//! tally.

use std::io::Write;

use logship_core::{Outcome, Reporter, RunReport};

/// Writes outcomes as they arrive. `quiet` keeps only the final tally.
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: W,
    quiet: bool,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(std::io::stdout(), quiet)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Human-readable line for one outcome.
pub fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Indexed {
            ordinal,
            document,
            ack,
        } => format!(
            "line {ordinal}: indexed {} {} {} -> {ack}",
            document.method, document.url, document.status
        ),
        Outcome::Rejected { line, reason } => {
            format!("line {}: {reason}: {}", line.ordinal, line.text)
        }
        Outcome::IndexFailed {
            ordinal,
            document,
            error,
        } => format!(
            "line {ordinal}: not indexed {} {}: {error}",
            document.method, document.url
        ),
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn record(&mut self, outcome: &Outcome) {
        if self.quiet {
            return;
        }
        // A closed stdout must not stop ingestion.
        let _ = writeln!(self.out, "{}", describe(outcome));
    }

    fn finish(&mut self, report: &RunReport) {
        if let Some(reason) = &report.abort {
            let _ = writeln!(self.out, "aborted: {reason}");
        } else if report.cancelled {
            let _ = writeln!(self.out, "cancelled after {} lines", report.lines_read);
        }
        let _ = writeln!(self.out, "{}", report.tally);
        let _ = self.out.flush();
    }
}
