// sqldiff-core/src/runtime/mod.rs
// ============================================================================
// Module: sqldiff Runtime
// Description: Verdicts, diffs, reports, sinks, preparation, and the loop.
// Purpose: Implement the differential execution and divergence pipeline.
// Dependencies: crate::{interfaces, model}, serde, similar, thiserror
// ============================================================================

//! ## Overview
//! The runtime wires the harness together: [`prepare`] resolves keys and
//! populates endpoints, [`harness`] runs the sequential loop, [`verdict`]
//! judges each statement, and [`sink`] turns divergences into reports built by
//! [`report`] and [`diff`]. [`events`] carries structured run events.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod diff;
pub mod events;
pub mod harness;
pub mod prepare;
pub mod report;
pub mod sink;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use diff::DiffSegment;
pub use diff::DiffStyle;
pub use diff::SegmentKind;
pub use diff::TextDiff;
pub use events::FileEventSink;
pub use events::NoopEventSink;
pub use events::RunEvent;
pub use events::RunEventSink;
pub use events::StderrEventSink;
pub use harness::Harness;
pub use harness::HarnessError;
pub use harness::HarnessOptions;
pub use harness::RunPhase;
pub use harness::RunSummary;
pub use harness::StopReason;
pub use prepare::GenerationMode;
pub use prepare::prepare_endpoints;
pub use prepare::resolve_keys;
pub use report::ReportOptions;
pub use sink::DumpDirectory;
pub use sink::DumpSink;
pub use verdict::CompareMode;
pub use verdict::Verdict;
pub use verdict::judge;
