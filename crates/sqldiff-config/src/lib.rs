// sqldiff-config/src/lib.rs
// ============================================================================
// Module: sqldiff Config Library
// Description: Configuration model, loading, and validation.
// Purpose: Single source of truth for sqldiff.toml semantics.
// Dependencies: serde, sqldiff-core, sqldiff-sqlite, toml
// ============================================================================

//! ## Overview
//! `sqldiff-config` defines the TOML configuration for a differential run,
//! loads it with strict size and path limits, merges command-line overrides,
//! and converts the result into harness and endpoint settings.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
