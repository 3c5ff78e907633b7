// sqldiff-cli/src/lib.rs
// ============================================================================
// Module: sqldiff CLI Library
// Description: Shared building blocks of the `sqldiff` binary.
// Purpose: Expose the message catalog, console events, and exec wiring.
// Dependencies: sqldiff-config, sqldiff-core, sqldiff-generate, sqldiff-sqlite
// ============================================================================

//! ## Overview
//! The binary in `main.rs` parses arguments and maps errors to exit codes;
//! everything it runs lives here so integration tests can drive it.

pub mod console;
pub mod exec;
pub mod i18n;

pub use console::ConsoleEventSink;
pub use console::render_event;
pub use exec::ExecError;
pub use exec::PreparedRun;
pub use exec::execute;
pub use exec::prepare_exec;
pub use exec::run_exec;
