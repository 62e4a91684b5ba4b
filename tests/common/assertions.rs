//! Domain-specific assertion macros for logship harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* counter or terminal state was wrong.

// ---------------------------------------------------------------------------
// Run report assertions
// ---------------------------------------------------------------------------

/// Assert the three outcome counters of a `RunReport`.
///
/// ```rust
/// assert_tally!(report, indexed: 2, rejected: 1, failed: 0);
/// ```
#[macro_export]
macro_rules! assert_tally {
    ($report:expr, indexed: $indexed:expr, rejected: $rejected:expr, failed: $failed:expr) => {{
        let report: &logship_core::RunReport = &$report;
        let expected = logship_core::Tally {
            indexed: $indexed,
            rejected: $rejected,
            failed: $failed,
        };
        if report.tally != expected {
            panic!(
                "assert_tally! failed:\n  expected: {}\n  actual:   {}\n  terminal: {:?}\n  abort: {:?}",
                expected, report.tally, report.terminal, report.abort
            );
        }
    }};
}

/// Assert that a run ended `Aborted` with an abort reason matching a pattern.
///
/// ```rust
/// assert_aborted!(report, AbortReason::Sink(IndexError::SinkUnavailable { .. }));
/// ```
#[macro_export]
macro_rules! assert_aborted {
    ($report:expr, $pattern:pat) => {{
        let report: &logship_core::RunReport = &$report;
        if report.terminal != logship_core::Terminal::Aborted {
            panic!(
                "assert_aborted! failed: run ended {:?}\n  tally: {}",
                report.terminal, report.tally
            );
        }
        match &report.abort {
            Some($pattern) => {}
            other => panic!(
                "assert_aborted! failed:\n  expected: {}\n  actual:   {:?}",
                stringify!($pattern),
                other
            ),
        }
        assert_ne!(report.exit_code(), 0, "aborted runs must exit non-zero");
    }};
}

/// Assert that a run ended `Closed` and was not cancelled.
#[macro_export]
macro_rules! assert_closed {
    ($report:expr) => {{
        let report: &logship_core::RunReport = &$report;
        if report.terminal != logship_core::Terminal::Closed || report.cancelled {
            panic!(
                "assert_closed! failed: terminal {:?}, cancelled {}, abort {:?}",
                report.terminal, report.cancelled, report.abort
            );
        }
        assert_eq!(report.exit_code(), 0);
    }};
}

// ---------------------------------------------------------------------------
// Connection assertions
// ---------------------------------------------------------------------------

/// Assert that every connection a run opened was closed again.
#[macro_export]
macro_rules! assert_released {
    ($probe:expr) => {{
        let events = $probe.lock().unwrap();
        if !events.opened.is_empty() && !events.source_closed {
            panic!("assert_released! failed: source opened but never closed");
        }
        if events.connected && !events.sink_closed {
            panic!("assert_released! failed: sink connected but never closed");
        }
    }};
}
