// sqldiff-core/src/model/outcome.rs
// ============================================================================
// Module: Statement Outcomes
// Description: Canonical result rows or a captured execution error.
// Purpose: Give the verdict and the report one textual form per outcome.
// Dependencies: std
// ============================================================================

//! ## Overview
//! An [`Outcome`] is what one endpoint produced for one statement. Endpoints
//! render rows deterministically before handing them over, so equality of
//! outcomes is plain string equality.
//!
//! ## Invariants
//! - Exactly one of rows or error is present.
//! - Canonical text is the error message for errors and the rows joined by
//!   `\n` otherwise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Canonically rendered result rows, in the order the endpoint returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRows {
    /// One canonical string per row.
    rows: Vec<String>,
}

impl ResultRows {
    /// Wraps already-rendered rows.
    #[must_use]
    pub const fn new(rows: Vec<String>) -> Self {
        Self {
            rows,
        }
    }

    /// Returns the rendered rows.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the statement produced no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows sorted, for multiset comparison.
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.rows.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }

    /// Returns the rows joined by newlines.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        self.rows.join("\n")
    }
}

/// Error captured while executing one statement on one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    /// Error message as reported by the endpoint.
    message: String,
}

impl ExecutionError {
    /// Captures an execution error message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-endpoint outcome of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Statement succeeded and produced these rows (possibly none).
    Rows(ResultRows),
    /// Statement failed with this error.
    Error(ExecutionError),
}

impl Outcome {
    /// Builds a successful outcome from rendered rows.
    #[must_use]
    pub fn rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Rows(ResultRows::new(rows.into_iter().map(Into::into).collect()))
    }

    /// Builds a failed outcome from an error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ExecutionError::new(message))
    }

    /// Returns the captured error, if the statement failed.
    #[must_use]
    pub const fn execution_error(&self) -> Option<&ExecutionError> {
        match self {
            Self::Rows(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Returns the canonical text used for comparison and reporting.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Rows(rows) => rows.canonical_text(),
            Self::Error(error) => error.message().to_string(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
