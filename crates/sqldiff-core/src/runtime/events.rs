// sqldiff-core/src/runtime/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured events emitted while a run progresses.
// Purpose: Emit machine-readable run logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The harness reports phase changes, recorded divergences, and periodic
//! progress as [`RunEvent`] values. Sinks decide where they go: stderr, an
//! append-only JSON-lines file, or nowhere. Event delivery is best effort and
//! never stops a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Structured run event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Statements executed so far.
    pub statements: u64,
    /// Divergences recorded so far.
    pub divergences: u64,
    /// Sequence number of the divergence this event refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    /// Free-form detail (statement text, error message, counts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RunEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event: &'static str, statements: u64, divergences: u64) -> Self {
        Self {
            event,
            timestamp_ms: now_ms(),
            statements,
            divergences,
            sequence: None,
            detail: None,
        }
    }

    /// Attaches a divergence sequence number.
    #[must_use]
    pub const fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Attaches a detail string.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Returns milliseconds since the Unix epoch, or zero if the clock is earlier.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for run events.
pub trait RunEventSink {
    /// Records an event.
    fn record(&self, event: &RunEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Event sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl RunEventSink for StderrEventSink {
    fn record(&self, event: &RunEvent) {
        if let Some(payload) = json_line(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Event sink that logs JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunEventSink for FileEventSink {
    fn record(&self, event: &RunEvent) {
        if let Some(payload) = json_line(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Serializes an event as one JSON line, without the trailing newline.
fn json_line(event: &RunEvent) -> Option<String> {
    serde_json::to_string(event).ok()
}

/// No-op event sink.
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn record(&self, _event: &RunEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
