// sqldiff-core/src/runtime/prepare.rs
// ============================================================================
// Module: Endpoint Preparation
// Description: Mode resolution and DDL application on both endpoints.
// Purpose: Bring both endpoints into a comparable state before the loop.
// Dependencies: crate::{interfaces, model, runtime::harness}
// ============================================================================

//! ## Overview
//! The run either generates fresh data (apply the generator's DDL to both
//! endpoints and use the generator's keys) or skips generation and reads the
//! keys from endpoint 1's live schema. Preparation is all-or-nothing per
//! statement: the first failure on either endpoint aborts the run, and
//! nothing already applied is rolled back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::interfaces::DataGenerator;
use crate::interfaces::Endpoint;
use crate::model::KeySet;
use crate::model::Outcome;
use crate::runtime::harness::HarnessError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How the run obtains its key set.
pub enum GenerationMode<'g> {
    /// Populate both endpoints from the generator, then use its keys.
    Generate(&'g mut dyn DataGenerator),
    /// Skip population and introspect endpoint 1.
    SkipGeneration,
}

// ============================================================================
// SECTION: Mode Resolver
// ============================================================================

/// Resolves the key set for the run, preparing endpoints when generating.
///
/// # Errors
///
/// Returns [`HarnessError::Generation`], [`HarnessError::Preparation`], or
/// [`HarnessError::Introspection`] on failure.
pub fn resolve_keys<A, B>(
    mode: GenerationMode<'_>,
    first: &mut A,
    second: &mut B,
) -> Result<KeySet, HarnessError>
where
    A: Endpoint + ?Sized,
    B: Endpoint + ?Sized,
{
    match mode {
        GenerationMode::Generate(generator) => {
            let preparation =
                generator.generate().map_err(|err| HarnessError::Generation(err.to_string()))?;
            prepare_endpoints(&preparation.statements, first, second)?;
            Ok(preparation.keys)
        }
        GenerationMode::SkipGeneration => {
            let keys = first.describe_schema().map_err(|err| HarnessError::Introspection {
                endpoint: first.label().to_string(),
                cause: err.to_string(),
            })?;
            if keys.is_empty() {
                return Err(HarnessError::Introspection {
                    endpoint: first.label().to_string(),
                    cause: "no tables found; endpoint must already be populated".to_string(),
                });
            }
            Ok(keys)
        }
    }
}

// ============================================================================
// SECTION: Endpoint Preparer
// ============================================================================

/// Applies each statement, in order, to endpoint 1 and then endpoint 2.
///
/// # Errors
///
/// Returns [`HarnessError::Preparation`] naming the statement and endpoint of
/// the first failure.
pub fn prepare_endpoints<A, B>(
    statements: &[String],
    first: &mut A,
    second: &mut B,
) -> Result<(), HarnessError>
where
    A: Endpoint + ?Sized,
    B: Endpoint + ?Sized,
{
    for statement in statements {
        apply(statement, first)?;
        apply(statement, second)?;
    }
    Ok(())
}

/// Applies one preparation statement to one endpoint.
fn apply<E: Endpoint + ?Sized>(statement: &str, endpoint: &mut E) -> Result<(), HarnessError> {
    match endpoint.execute(statement) {
        Outcome::Rows(_) => Ok(()),
        Outcome::Error(error) => Err(HarnessError::Preparation {
            endpoint: endpoint.label().to_string(),
            statement: statement.to_string(),
            cause: error.message().to_string(),
        }),
    }
}
