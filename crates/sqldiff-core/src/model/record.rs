// sqldiff-core/src/model/record.rs
// ============================================================================
// Module: Divergence Records
// Description: Immutable record of one inconsistent statement.
// Purpose: Capture everything needed to review a divergence offline.
// Dependencies: crate::model::outcome
// ============================================================================

//! ## Overview
//! A [`DivergenceRecord`] is built by the divergence sink once it has
//! allocated a sequence number. Records are never mutated after creation and
//! are written to durable storage exactly once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::outcome::Outcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One endpoint's label and outcome for a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResult {
    /// Endpoint display label (its connection descriptor).
    pub label: String,
    /// Outcome produced by the endpoint.
    pub outcome: Outcome,
}

/// A statement whose two outcomes were judged inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceRecord {
    /// Dense sequence number, starting at zero for each run.
    sequence: u64,
    /// Statement text exactly as executed.
    sql: String,
    /// Endpoint 1 label and outcome.
    first: EndpointResult,
    /// Endpoint 2 label and outcome.
    second: EndpointResult,
}

impl DivergenceRecord {
    /// Creates a record for an allocated sequence number.
    #[must_use]
    pub fn new(
        sequence: u64,
        sql: impl Into<String>,
        first: EndpointResult,
        second: EndpointResult,
    ) -> Self {
        Self {
            sequence,
            sql: sql.into(),
            first,
            second,
        }
    }

    /// Returns the sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the statement text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns endpoint 1's result.
    #[must_use]
    pub const fn first(&self) -> &EndpointResult {
        &self.first
    }

    /// Returns endpoint 2's result.
    #[must_use]
    pub const fn second(&self) -> &EndpointResult {
        &self.second
    }

    /// Returns the artifact file name for this record.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.log", self.sequence)
    }
}
