// sqldiff-generate/src/lib.rs
// ============================================================================
// Module: sqldiff Generate Library
// Description: Data generators and statement sources for the harness.
// Purpose: Provide file-driven preparation and statement streams.
// Dependencies: rand, sqldiff-core, sqldiff-sqlite, thiserror
// ============================================================================

//! ## Overview
//! - [`ScriptGenerator`] prepares endpoints from a DDL script.
//! - [`ScriptSourceFactory`] replays a finite statement script.
//! - [`TemplateSourceFactory`] expands templates against the run's keys
//!   without end, reproducibly for a given seed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod input;
pub mod script;
pub mod source;
pub mod split;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use input::InputError;
pub use input::MAX_SCRIPT_BYTES;
pub use input::read_script;
pub use script::ScriptGenerator;
pub use script::ScriptSource;
pub use script::ScriptSourceFactory;
pub use source::InputSource;
pub use source::StatementInput;
pub use split::split_statements;
pub use template::INT_RANGE;
pub use template::Placeholder;
pub use template::Segment;
pub use template::Template;
pub use template::TemplateSource;
pub use template::TemplateSourceFactory;
