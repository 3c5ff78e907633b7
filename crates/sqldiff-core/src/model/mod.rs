// sqldiff-core/src/model/mod.rs
// ============================================================================
// Module: sqldiff Data Model
// Description: Budgets, outcomes, key sets, and divergence records.
// Purpose: Group the value types shared by every harness component.
// Dependencies: serde, std
// ============================================================================

//! ## Overview
//! The data model is deliberately small: a statement budget, the per-endpoint
//! outcome of one statement, the key set handed to statement sources, and the
//! immutable divergence record written by the sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod budget;
pub mod keys;
pub mod outcome;
pub mod record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use budget::StatementBudget;
pub use keys::KeySet;
pub use outcome::ExecutionError;
pub use outcome::Outcome;
pub use outcome::ResultRows;
pub use record::DivergenceRecord;
pub use record::EndpointResult;
