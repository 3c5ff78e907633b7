// sqldiff-core/src/interfaces/mod.rs
// ============================================================================
// Module: sqldiff Interfaces
// Description: Contracts for endpoints, generators, sources, and sinks.
// Purpose: Keep the harness independent of any database or grammar engine.
// Dependencies: crate::model, thiserror
// ============================================================================

//! ## Overview
//! The harness never talks to a database, a grammar engine, or the file
//! system directly. It reaches them through the traits defined here:
//! - [`Endpoint`] executes one statement and renders its outcome.
//! - [`DataGenerator`] produces the preparation DDL and the derived keys.
//! - [`StatementSourceFactory`] / [`StatementSource`] feed the loop.
//! - [`DivergenceSink`] persists divergences.
//!
//! Implementations must be deterministic for a fixed input so that dump
//! ordering is reproducible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::model::DivergenceRecord;
use crate::model::KeySet;
use crate::model::Outcome;

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Endpoint errors outside of per-statement execution.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The endpoint could not be reached.
    #[error("endpoint connect error: {0}")]
    Connect(String),
    /// The live schema could not be read.
    #[error("endpoint schema error: {0}")]
    Schema(String),
}

/// One of the two systems under comparison.
pub trait Endpoint {
    /// Returns the display label (the connection descriptor).
    fn label(&self) -> &str;

    /// Executes one statement. Execution failures are captured in the
    /// returned [`Outcome`], never raised.
    fn execute(&mut self, sql: &str) -> Outcome;

    /// Derives a key set from the endpoint's live schema.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the schema cannot be read.
    fn describe_schema(&mut self) -> Result<KeySet, EndpointError>;
}

// ============================================================================
// SECTION: Data Generator
// ============================================================================

/// Data generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Input could not be read.
    #[error("generate io error: {0}")]
    Io(String),
    /// Input was read but is unusable.
    #[error("generate invalid input: {0}")]
    Invalid(String),
}

/// Output of the generation process: DDL to apply and keys to generate with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preparation {
    /// Schema and data statements, applied in order to both endpoints.
    pub statements: Vec<String>,
    /// Keys derived from the generated schema.
    pub keys: KeySet,
}

/// Produces the statements that populate both endpoints.
pub trait DataGenerator {
    /// Generates the preparation batch and its key set.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] when generation fails.
    fn generate(&mut self) -> Result<Preparation, GenerateError>;
}

// ============================================================================
// SECTION: Statement Source
// ============================================================================

/// Errors of the statement generation machinery itself.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input could not be read.
    #[error("statement source io error: {0}")]
    Io(String),
    /// Input or keys cannot produce statements.
    #[error("statement source invalid: {0}")]
    Invalid(String),
}

/// Stream of SQL statements fed to the loop.
pub trait StatementSource {
    /// Returns the next statement, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source itself fails; the run aborts.
    fn next_statement(&mut self) -> Result<Option<String>, SourceError>;
}

/// Opens a statement source for a key set.
pub trait StatementSourceFactory {
    /// Concrete source type produced by this factory.
    type Source: StatementSource;

    /// Opens a source that generates statements against `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source cannot be opened.
    fn open(&mut self, keys: &KeySet) -> Result<Self::Source, SourceError>;
}

// ============================================================================
// SECTION: Divergence Sink
// ============================================================================

/// Divergence sink errors. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The dump directory exists before the run started.
    #[error("dump directory already exists: {}", path.display())]
    AlreadyExists {
        /// Offending path.
        path: PathBuf,
    },
    /// File-system failure while preparing or writing.
    #[error("dump io error at {}: {message}", path.display())]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// A record was submitted before [`DivergenceSink::prepare`] succeeded.
    #[error("divergence sink used before prepare")]
    NotPrepared,
}

/// Borrowed view of one endpoint's label and outcome.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// Endpoint display label.
    pub label: &'a str,
    /// Outcome produced by the endpoint.
    pub outcome: &'a Outcome,
}

/// Receives divergences from the loop.
pub trait DivergenceSink {
    /// Prepares durable storage; called once when the loop starts.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when storage cannot be prepared.
    fn prepare(&mut self) -> Result<(), SinkError>;

    /// Allocates the next sequence number and persists the divergence.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the record cannot be persisted.
    fn record(
        &mut self,
        sql: &str,
        first: Observation<'_>,
        second: Observation<'_>,
    ) -> Result<DivergenceRecord, SinkError>;
}
