// sqldiff-sqlite/src/value.rs
// ============================================================================
// Module: Value Rendering
// Description: Canonical text form of SQLite column values.
// Purpose: Make rows from two databases comparable as plain strings.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Values render as `NULL`, decimal integers, reals with at least one
//! fractional digit when integral, text as-is (lossy UTF-8), and blobs as
//! `x'..'` uppercase hex literals. Columns of one row are joined with
//! [`COLUMN_SEPARATOR`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use rusqlite::types::ValueRef;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator placed between the rendered columns of a row.
pub const COLUMN_SEPARATOR: char = '\t';

/// Integral reals below this magnitude keep a `.0` suffix.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e15;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders one column value.
#[must_use]
pub fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(integer) => integer.to_string(),
        ValueRef::Real(real) => format_float(real),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => render_blob(bytes),
    }
}

/// Formats a real so that integral values stay distinguishable from integers.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < INTEGRAL_FLOAT_LIMIT {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Renders a blob as an uppercase hex literal.
fn render_blob(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("x'");
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out.push('\'');
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
