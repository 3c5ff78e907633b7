// sqldiff-generate/src/source.rs
// ============================================================================
// Module: Statement Input Selection
// Description: One factory type over the script and template sources.
// Purpose: Let callers pick the statement input at runtime.
// Dependencies: sqldiff-core
// ============================================================================

//! ## Overview
//! The loop is generic over a single factory type; [`StatementInput`] wraps
//! either concrete factory so the choice can follow configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sqldiff_core::KeySet;
use sqldiff_core::SourceError;
use sqldiff_core::StatementSource;
use sqldiff_core::StatementSourceFactory;

use crate::script::ScriptSource;
use crate::script::ScriptSourceFactory;
use crate::template::TemplateSource;
use crate::template::TemplateSourceFactory;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Statement input chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementInput {
    /// Finite statement script.
    Script(ScriptSourceFactory),
    /// Unbounded template stream.
    Templates(TemplateSourceFactory),
}

/// Source opened from a [`StatementInput`].
#[derive(Debug)]
pub enum InputSource {
    /// Script replay.
    Script(ScriptSource),
    /// Template expansion.
    Templates(TemplateSource),
}

impl StatementSourceFactory for StatementInput {
    type Source = InputSource;

    fn open(&mut self, keys: &KeySet) -> Result<InputSource, SourceError> {
        match self {
            Self::Script(factory) => factory.open(keys).map(InputSource::Script),
            Self::Templates(factory) => factory.open(keys).map(InputSource::Templates),
        }
    }
}

impl StatementSource for InputSource {
    fn next_statement(&mut self) -> Result<Option<String>, SourceError> {
        match self {
            Self::Script(source) => source.next_statement(),
            Self::Templates(source) => source.next_statement(),
        }
    }
}
