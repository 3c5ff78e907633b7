// sqldiff-cli/src/exec.rs
// ============================================================================
// Module: Exec Orchestration
// Description: Wires configuration, endpoints, inputs, and sinks into a run.
// Purpose: Execute one differential run from a validated configuration.
// Dependencies: sqldiff-config, sqldiff-core, sqldiff-generate, sqldiff-sqlite
// ============================================================================

//! ## Overview
//! [`prepare_exec`] performs the preconditions the harness cannot check
//! itself, in a fixed order, and [`PreparedRun::run`] then hands the run to
//! [`Harness`]. [`execute`] opens the event log between the two steps.
//! The preconditions are:
//! 1. The configuration names both endpoints and a statement input.
//! 2. The dump directory does not exist yet.
//! 3. Endpoint 1, then endpoint 2, accept a connection.
//!
//! ## Invariants
//! - A failed precondition leaves the file system and both endpoints untouched,
//!   and no event log is created.
//! - The dump directory is only created once the harness reaches its loop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use sqldiff_config::HarnessConfig;
use sqldiff_core::DumpDirectory;
use sqldiff_core::DumpSink;
use sqldiff_core::FileEventSink;
use sqldiff_core::GenerationMode;
use sqldiff_core::Harness;
use sqldiff_core::HarnessError;
use sqldiff_core::RunEventSink;
use sqldiff_core::RunSummary;
use sqldiff_core::SinkError;
use sqldiff_generate::ScriptGenerator;
use sqldiff_generate::ScriptSourceFactory;
use sqldiff_generate::StatementInput;
use sqldiff_generate::TemplateSourceFactory;
use sqldiff_sqlite::SqliteEndpoint;
use thiserror::Error;

use crate::console::ConsoleEventSink;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal conditions of an `exec` run.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The configuration cannot describe a run.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The dump directory exists before the run.
    #[error("dump directory already exists: {}", path.display())]
    DumpExists {
        /// Offending path.
        path: PathBuf,
    },
    /// The dump directory could not be checked.
    #[error("dump directory unavailable: {0}")]
    DumpUnavailable(String),
    /// An endpoint refused every connection attempt.
    #[error("cannot connect to {endpoint}: {cause}")]
    Connection {
        /// Which endpoint failed.
        endpoint: String,
        /// Last connection error.
        cause: String,
    },
    /// The event log could not be opened.
    #[error("cannot open event log {}: {cause}", path.display())]
    EventLog {
        /// Event log path.
        path: PathBuf,
        /// Underlying error message.
        cause: String,
    },
    /// The harness aborted.
    #[error(transparent)]
    Harness(#[from] HarnessError),
}

// ============================================================================
// SECTION: Exec
// ============================================================================

/// A run whose preconditions have all passed.
pub struct PreparedRun<'c> {
    /// Validated configuration.
    config: &'c HarnessConfig,
    /// Reserved dump directory.
    directory: DumpDirectory,
    /// Connected endpoint 1.
    first: SqliteEndpoint,
    /// Connected endpoint 2.
    second: SqliteEndpoint,
    /// Selected statement input.
    input: StatementInput,
}

/// Checks every precondition of a run described by `config`.
///
/// # Errors
///
/// Returns [`ExecError`] for the first failed precondition.
pub fn prepare_exec(config: &HarnessConfig) -> Result<PreparedRun<'_>, ExecError> {
    config.validate_for_exec().map_err(|err| ExecError::Configuration(err.to_string()))?;
    let (Some(dsn1), Some(dsn2)) =
        (config.endpoints.dsn1.as_deref(), config.endpoints.dsn2.as_deref())
    else {
        return Err(ExecError::Configuration("both endpoint descriptors are required".to_string()));
    };
    let input = statement_input(config)?;
    let directory = DumpDirectory::reserve(config.dump.dir.clone()).map_err(|err| match err {
        SinkError::AlreadyExists {
            path,
        } => ExecError::DumpExists {
            path,
        },
        other => ExecError::DumpUnavailable(other.to_string()),
    })?;

    let first = connect(config, "endpoint 1", dsn1)?;
    let second = connect(config, "endpoint 2", dsn2)?;
    Ok(PreparedRun {
        config,
        directory,
        first,
        second,
        input,
    })
}

impl PreparedRun<'_> {
    /// Hands the run to the harness.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Harness`] when the harness aborts.
    pub fn run(self, events: &dyn RunEventSink) -> Result<RunSummary, ExecError> {
        let Self {
            config,
            directory,
            first,
            second,
            mut input,
        } = self;
        let sink = DumpSink::new(directory, config.report_options());
        let mut harness = Harness::new(first, second, sink, config.harness_options(), events);
        let summary = if config.run.skip_generation {
            harness.run(GenerationMode::SkipGeneration, &mut input)?
        } else {
            let ddl = config.input.ddl.clone().ok_or_else(|| {
                ExecError::Configuration("input.ddl is required for generation".to_string())
            })?;
            let mut generator = ScriptGenerator::new(ddl);
            harness.run(GenerationMode::Generate(&mut generator), &mut input)?
        };
        Ok(summary)
    }
}

/// Checks preconditions and runs the harness with the given event sink.
///
/// # Errors
///
/// Returns [`ExecError`] for failed preconditions and harness aborts.
pub fn run_exec(
    config: &HarnessConfig,
    events: &dyn RunEventSink,
) -> Result<RunSummary, ExecError> {
    prepare_exec(config)?.run(events)
}

/// Checks preconditions, opens the configured event log, and runs the
/// harness with console event output.
///
/// # Errors
///
/// Returns [`ExecError`] for failed preconditions, an unusable event log, and
/// harness aborts.
pub fn execute(config: &HarnessConfig) -> Result<RunSummary, ExecError> {
    let prepared = prepare_exec(config)?;
    let event_log = match &config.log.event_log {
        Some(path) => Some(FileEventSink::new(path).map_err(|err| ExecError::EventLog {
            path: path.clone(),
            cause: err.to_string(),
        })?),
        None => None,
    };
    prepared.run(&ConsoleEventSink::new(event_log))
}

/// Selects the configured statement input.
fn statement_input(config: &HarnessConfig) -> Result<StatementInput, ExecError> {
    match (&config.input.statements, &config.input.templates) {
        (Some(path), None) => Ok(StatementInput::Script(ScriptSourceFactory::new(path.clone()))),
        (None, Some(path)) => Ok(StatementInput::Templates(TemplateSourceFactory::new(
            path.clone(),
            config.run.seed,
        ))),
        _ => Err(ExecError::Configuration(
            "exactly one of input.statements or input.templates is required".to_string(),
        )),
    }
}

/// Connects to one endpoint with the configured retry policy.
fn connect(config: &HarnessConfig, role: &str, dsn: &str) -> Result<SqliteEndpoint, ExecError> {
    SqliteEndpoint::connect_with_retry(&config.endpoint_config(dsn)).map_err(|err| {
        ExecError::Connection {
            endpoint: format!("{role} ({dsn})"),
            cause: err.to_string(),
        }
    })
}
