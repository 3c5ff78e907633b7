// sqldiff-core/src/runtime/harness.rs
// ============================================================================
// Module: Differential Execution Loop
// Description: Sequential loop comparing two endpoints statement by statement.
// Purpose: Find and record every statement on which the endpoints disagree.
// Dependencies: crate::{interfaces, model, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`Harness`] owns both endpoints and the divergence sink for one run and
//! moves through `Idle → Preparing → Running → {Completed, FatalAborted}`.
//! Each iteration checks the budget, pulls one statement, executes it on
//! endpoint 1 and then endpoint 2, judges the pair, and hands divergences to
//! the sink before pulling the next statement.
//!
//! ## Invariants
//! - Nothing runs concurrently; divergence numbering is deterministic for a
//!   deterministic statement stream.
//! - Per-statement execution errors never stop the loop.
//! - Source errors and sink errors always stop the loop.
//! - A harness runs at most once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::interfaces::DivergenceSink;
use crate::interfaces::Endpoint;
use crate::interfaces::Observation;
use crate::interfaces::SinkError;
use crate::interfaces::StatementSource;
use crate::interfaces::StatementSourceFactory;
use crate::model::StatementBudget;
use crate::runtime::events::RunEvent;
use crate::runtime::events::RunEventSink;
use crate::runtime::prepare::GenerationMode;
use crate::runtime::prepare::resolve_keys;
use crate::runtime::verdict::CompareMode;
use crate::runtime::verdict::Verdict;
use crate::runtime::verdict::judge;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Constructed, not started.
    Idle,
    /// Resolving keys and preparing endpoints.
    Preparing,
    /// Executing statements.
    Running,
    /// Stopped normally.
    Completed,
    /// Stopped on a fatal error.
    FatalAborted,
}

/// Why a completed run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The statement source reported exhaustion.
    SourceExhausted,
    /// The statement budget was reached.
    BudgetReached,
}

/// Loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Statement cap.
    pub budget: StatementBudget,
    /// Row ordering sensitivity.
    pub compare_mode: CompareMode,
    /// Emit a progress event every this many statements; zero disables.
    pub progress_interval: u64,
}

/// Totals of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Statements executed on both endpoints.
    pub statements: u64,
    /// Divergences recorded.
    pub divergences: u64,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
}

/// Fatal harness errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// [`Harness::run`] was called more than once.
    #[error("harness already started")]
    AlreadyStarted,
    /// The data generator failed.
    #[error("data generation failed: {0}")]
    Generation(String),
    /// A preparation statement failed on one endpoint.
    #[error("data prepare ddl failed on {endpoint}: {cause}; statement: {statement}")]
    Preparation {
        /// Label of the failing endpoint.
        endpoint: String,
        /// Statement that failed.
        statement: String,
        /// Endpoint error message.
        cause: String,
    },
    /// Keys could not be read from the live schema.
    #[error("schema introspection failed on {endpoint}: {cause}")]
    Introspection {
        /// Label of the introspected endpoint.
        endpoint: String,
        /// Failure cause.
        cause: String,
    },
    /// The statement source failed.
    #[error("statement source failed: {0}")]
    Source(String),
    /// The divergence sink could not prepare or persist.
    #[error("divergence persistence failed: {0}")]
    Persistence(#[from] SinkError),
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Differential execution loop over two endpoints.
pub struct Harness<'e, A, B, S> {
    /// Endpoint 1 (the system under test by convention).
    first: A,
    /// Endpoint 2 (the reference by convention).
    second: B,
    /// Divergence sink.
    sink: S,
    /// Loop configuration.
    options: HarnessOptions,
    /// Structured event destination.
    events: &'e dyn RunEventSink,
    /// Current lifecycle phase.
    phase: RunPhase,
    /// Statements executed so far.
    statements: u64,
    /// Divergences recorded so far.
    divergences: u64,
}

impl<'e, A, B, S> Harness<'e, A, B, S>
where
    A: Endpoint,
    B: Endpoint,
    S: DivergenceSink,
{
    /// Creates an idle harness.
    #[must_use]
    pub fn new(
        first: A,
        second: B,
        sink: S,
        options: HarnessOptions,
        events: &'e dyn RunEventSink,
    ) -> Self {
        Self {
            first,
            second,
            sink,
            options,
            events,
            phase: RunPhase::Idle,
            statements: 0,
            divergences: 0,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Returns the sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the harness and returns its endpoints and sink.
    pub fn into_parts(self) -> (A, B, S) {
        (self.first, self.second, self.sink)
    }

    /// Runs the harness to completion.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] on any fatal condition; the phase is then
    /// [`RunPhase::FatalAborted`].
    pub fn run<F>(
        &mut self,
        mode: GenerationMode<'_>,
        factory: &mut F,
    ) -> Result<RunSummary, HarnessError>
    where
        F: StatementSourceFactory,
    {
        if self.phase != RunPhase::Idle {
            return Err(HarnessError::AlreadyStarted);
        }
        self.emit(RunEvent::new("run_started", 0, 0).with_detail(format!(
            "budget={} compare={}",
            self.options.budget,
            self.options.compare_mode.label()
        )));
        let result = self.run_phases(mode, factory);
        match &result {
            Ok(summary) => {
                self.phase = RunPhase::Completed;
                self.emit(self.event("run_completed").with_detail(match summary.stop_reason {
                    StopReason::SourceExhausted => "source_exhausted",
                    StopReason::BudgetReached => "budget_reached",
                }));
            }
            Err(err) => {
                self.phase = RunPhase::FatalAborted;
                self.emit(self.event("run_aborted").with_detail(err.to_string()));
            }
        }
        result
    }

    /// Preparing and Running phases.
    fn run_phases<F>(
        &mut self,
        mode: GenerationMode<'_>,
        factory: &mut F,
    ) -> Result<RunSummary, HarnessError>
    where
        F: StatementSourceFactory,
    {
        self.phase = RunPhase::Preparing;
        let generated = matches!(mode, GenerationMode::Generate(_));
        let keys = resolve_keys(mode, &mut self.first, &mut self.second)?;
        let kind = if generated { "preparation_completed" } else { "generation_skipped" };
        self.emit(self.event(kind).with_detail(format!("tables={}", keys.table_count())));

        let mut source = factory.open(&keys).map_err(|err| HarnessError::Source(err.to_string()))?;
        self.sink.prepare()?;
        self.phase = RunPhase::Running;
        self.emit(self.event("loop_started"));
        self.drive(&mut source)
    }

    /// The statement loop.
    fn drive<T: StatementSource>(&mut self, source: &mut T) -> Result<RunSummary, HarnessError> {
        loop {
            if !self.options.budget.allows(self.statements) {
                return Ok(self.summary(StopReason::BudgetReached));
            }
            let Some(sql) =
                source.next_statement().map_err(|err| HarnessError::Source(err.to_string()))?
            else {
                return Ok(self.summary(StopReason::SourceExhausted));
            };
            self.statements += 1;

            let first = self.first.execute(&sql);
            let second = self.second.execute(&sql);
            if judge(&first, &second, self.options.compare_mode) == Verdict::Divergent {
                let record = self.sink.record(
                    &sql,
                    Observation {
                        label: self.first.label(),
                        outcome: &first,
                    },
                    Observation {
                        label: self.second.label(),
                        outcome: &second,
                    },
                )?;
                self.divergences += 1;
                self.emit(
                    self.event("divergence_recorded")
                        .with_sequence(record.sequence())
                        .with_detail(sql),
                );
            }

            let interval = self.options.progress_interval;
            if interval > 0 && self.statements % interval == 0 {
                self.emit(self.event("progress"));
            }
        }
    }

    /// Builds the summary for a completed loop.
    const fn summary(&self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            statements: self.statements,
            divergences: self.divergences,
            stop_reason,
        }
    }

    /// Builds an event stamped with the current counters.
    fn event(&self, kind: &'static str) -> RunEvent {
        RunEvent::new(kind, self.statements, self.divergences)
    }

    /// Forwards an event to the event sink.
    fn emit(&self, event: RunEvent) {
        self.events.record(&event);
    }
}
