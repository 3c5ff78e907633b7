// sqldiff-cli/src/console.rs
// ============================================================================
// Module: Console Event Rendering
// Description: Human-readable stderr rendering of run events.
// Purpose: Report run progress through the message catalog.
// Dependencies: sqldiff-core
// ============================================================================

//! ## Overview
//! [`ConsoleEventSink`] prints each run event as one catalog line on stderr
//! and optionally forwards the structured event to a JSON-lines event log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use sqldiff_core::FileEventSink;
use sqldiff_core::RunEvent;
use sqldiff_core::RunEventSink;

use crate::t;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders `event` as a single catalog line; unknown event kinds render as
/// `None`.
#[must_use]
pub fn render_event(event: &RunEvent) -> Option<String> {
    let detail = event.detail.as_deref().map(single_line).unwrap_or_default();
    let statements = event.statements;
    let divergences = event.divergences;
    let line = match event.event {
        "run_started" => t!("event.run_started", detail = detail),
        "preparation_completed" => t!("event.preparation_completed", detail = detail),
        "generation_skipped" => t!("event.generation_skipped", detail = detail),
        "loop_started" => t!("event.loop_started"),
        "divergence_recorded" => t!(
            "event.divergence_recorded",
            sequence = event.sequence.map(|sequence| sequence.to_string()).unwrap_or_default(),
            detail = detail
        ),
        "progress" => t!("event.progress", statements = statements, divergences = divergences),
        "run_completed" => t!(
            "event.run_completed",
            statements = statements,
            divergences = divergences,
            detail = detail
        ),
        "run_aborted" => t!("event.run_aborted", detail = detail),
        _ => return None,
    };
    Some(line)
}

/// Collapses whitespace runs, including newlines, to single spaces.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Event sink printing catalog lines to stderr.
pub struct ConsoleEventSink {
    /// Optional structured event log.
    event_log: Option<FileEventSink>,
}

impl ConsoleEventSink {
    /// Creates a console sink, forwarding events to `event_log` when present.
    #[must_use]
    pub const fn new(event_log: Option<FileEventSink>) -> Self {
        Self {
            event_log,
        }
    }
}

impl RunEventSink for ConsoleEventSink {
    fn record(&self, event: &RunEvent) {
        if let Some(line) = render_event(event) {
            let _ = writeln!(std::io::stderr(), "{line}");
        }
        if let Some(event_log) = &self.event_log {
            event_log.record(event);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn divergence_lines_are_single_line() {
        let event = RunEvent::new("divergence_recorded", 4, 1)
            .with_sequence(0)
            .with_detail("SELECT a\n  FROM t");
        assert_eq!(render_event(&event).unwrap(), "Divergence 0 recorded: SELECT a FROM t");
    }

    #[test]
    fn progress_reports_counters() {
        let event = RunEvent::new("progress", 200, 3);
        assert_eq!(
            render_event(&event).unwrap(),
            "200 statements executed, 3 divergences."
        );
    }

    #[test]
    fn unknown_events_are_not_rendered() {
        assert!(render_event(&RunEvent::new("heartbeat", 0, 0)).is_none());
    }

    #[test]
    fn events_are_forwarded_to_the_event_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = ConsoleEventSink::new(Some(FileEventSink::new(&path).unwrap()));
        sink.record(&RunEvent::new("loop_started", 0, 0));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"event\":\"loop_started\""));
    }
}
