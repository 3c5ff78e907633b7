// sqldiff-generate/src/script.rs
// ============================================================================
// Module: Script Generator and Source
// Description: DDL script preparation and finite statement scripts.
// Purpose: Populate endpoints from a script and replay a fixed statement list.
// Dependencies: sqldiff-core, sqldiff-sqlite
// ============================================================================

//! ## Overview
//! [`ScriptGenerator`] reads a DDL script, splits it into statements, and
//! derives the key set by applying the script to a private in-memory
//! database and introspecting the result. The keys therefore describe the
//! schema the script produces, independent of either endpoint.
//!
//! [`ScriptSourceFactory`] replays a statement script verbatim and is
//! exhausted after its last statement.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::path::PathBuf;

use sqldiff_core::DataGenerator;
use sqldiff_core::Endpoint;
use sqldiff_core::GenerateError;
use sqldiff_core::KeySet;
use sqldiff_core::Outcome;
use sqldiff_core::Preparation;
use sqldiff_core::SourceError;
use sqldiff_core::StatementSource;
use sqldiff_core::StatementSourceFactory;
use sqldiff_sqlite::SqliteEndpoint;
use sqldiff_sqlite::SqliteEndpointConfig;

use crate::input::read_script;
use crate::split::split_statements;

// ============================================================================
// SECTION: Script Generator
// ============================================================================

/// Data generator backed by a DDL script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptGenerator {
    /// Path of the DDL script.
    path: PathBuf,
}

impl ScriptGenerator {
    /// Creates a generator for the script at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }
}

impl DataGenerator for ScriptGenerator {
    fn generate(&mut self) -> Result<Preparation, GenerateError> {
        let script = read_script(&self.path)?;
        let statements = split_statements(&script);
        if statements.is_empty() {
            return Err(GenerateError::Invalid(format!(
                "ddl script {} contains no statements",
                self.path.display()
            )));
        }
        let keys = derive_keys(&statements)?;
        Ok(Preparation {
            statements,
            keys,
        })
    }
}

/// Applies `statements` to a scratch database and reads back its schema.
fn derive_keys(statements: &[String]) -> Result<KeySet, GenerateError> {
    let mut scratch = SqliteEndpoint::connect(&SqliteEndpointConfig::new(":memory:"))
        .map_err(|err| GenerateError::Io(err.to_string()))?;
    for statement in statements {
        if let Outcome::Error(error) = scratch.execute(statement) {
            return Err(GenerateError::Invalid(format!(
                "ddl statement rejected by scratch database: {error}; statement: {statement}"
            )));
        }
    }
    scratch.describe_schema().map_err(|err| GenerateError::Invalid(err.to_string()))
}

// ============================================================================
// SECTION: Script Source
// ============================================================================

/// Factory opening a finite statement script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSourceFactory {
    /// Path of the statement script.
    path: PathBuf,
}

impl ScriptSourceFactory {
    /// Creates a factory for the script at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }
}

impl StatementSourceFactory for ScriptSourceFactory {
    type Source = ScriptSource;

    fn open(&mut self, _keys: &KeySet) -> Result<ScriptSource, SourceError> {
        let script = read_script(&self.path)?;
        Ok(ScriptSource::new(split_statements(&script)))
    }
}

/// Finite source yielding a fixed list of statements in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    /// Statements not yet yielded.
    remaining: VecDeque<String>,
}

impl ScriptSource {
    /// Creates a source over `statements`.
    #[must_use]
    pub fn new(statements: Vec<String>) -> Self {
        Self {
            remaining: statements.into(),
        }
    }
}

impl StatementSource for ScriptSource {
    fn next_statement(&mut self) -> Result<Option<String>, SourceError> {
        Ok(self.remaining.pop_front())
    }
}
