// sqldiff-core/src/lib.rs
// ============================================================================
// Module: sqldiff Core Library
// Description: Public API surface for the differential SQL harness core.
// Purpose: Expose the data model, collaborator interfaces, and runtime.
// Dependencies: crate::{interfaces, model, runtime}
// ============================================================================

//! ## Overview
//! `sqldiff-core` drives one stream of SQL statements against two endpoints,
//! judges each pair of outcomes as consistent or divergent, and persists a
//! self-contained report for every divergence. Statement generation,
//! statement execution, and connection handling are reached only through the
//! traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod interfaces;
pub mod model;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::*;

pub use interfaces::DataGenerator;
pub use interfaces::DivergenceSink;
pub use interfaces::Endpoint;
pub use interfaces::EndpointError;
pub use interfaces::GenerateError;
pub use interfaces::Observation;
pub use interfaces::Preparation;
pub use interfaces::SinkError;
pub use interfaces::SourceError;
pub use interfaces::StatementSource;
pub use interfaces::StatementSourceFactory;
pub use runtime::CompareMode;
pub use runtime::DiffSegment;
pub use runtime::DiffStyle;
pub use runtime::DumpDirectory;
pub use runtime::DumpSink;
pub use runtime::FileEventSink;
pub use runtime::GenerationMode;
pub use runtime::Harness;
pub use runtime::HarnessError;
pub use runtime::HarnessOptions;
pub use runtime::NoopEventSink;
pub use runtime::ReportOptions;
pub use runtime::RunEvent;
pub use runtime::RunEventSink;
pub use runtime::RunPhase;
pub use runtime::RunSummary;
pub use runtime::SegmentKind;
pub use runtime::StderrEventSink;
pub use runtime::StopReason;
pub use runtime::TextDiff;
pub use runtime::Verdict;
pub use runtime::judge;
pub use runtime::prepare_endpoints;
pub use runtime::resolve_keys;
