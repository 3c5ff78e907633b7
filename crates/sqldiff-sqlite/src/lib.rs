// sqldiff-sqlite/src/lib.rs
// ============================================================================
// Module: sqldiff SQLite Endpoint
// Description: SQLite-backed implementation of the core endpoint interface.
// Purpose: Let the harness compare SQLite databases and builds.
// Dependencies: rusqlite, sqldiff-core, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteEndpoint`] wraps one `rusqlite` connection. Every statement result
//! is rendered to canonical row strings so that two databases can be compared
//! textually, and per-statement failures are returned as error outcomes
//! rather than raised.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod endpoint;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use endpoint::DEFAULT_BUSY_TIMEOUT_MS;
pub use endpoint::DEFAULT_CONNECT_BACKOFF_MS;
pub use endpoint::DEFAULT_CONNECT_RETRIES;
pub use endpoint::SqliteEndpoint;
pub use endpoint::SqliteEndpointConfig;
pub use endpoint::SqliteEndpointError;
pub use endpoint::backoff_duration;
pub use value::COLUMN_SEPARATOR;
pub use value::render_value;
