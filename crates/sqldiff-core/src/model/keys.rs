// sqldiff-core/src/model/keys.rs
// ============================================================================
// Module: Key Set
// Description: Table and column names available to statement sources.
// Purpose: Carry the schema-derived keys from preparation to generation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`KeySet`] is derived either from a freshly generated schema or from a
//! live endpoint. Statement sources use it to produce statements that refer
//! to tables and columns that actually exist. Ordering is deterministic:
//! tables sort by name and columns keep their declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Table name to ordered column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    /// Columns keyed by table name.
    tables: BTreeMap<String, Vec<String>>,
}

impl KeySet {
    /// Creates an empty key set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Adds or replaces a table and its columns.
    pub fn insert_table(&mut self, table: impl Into<String>, columns: Vec<String>) {
        self.tables.insert(table.into(), columns);
    }

    /// Returns the columns of `table`, if known.
    #[must_use]
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Returns the table names in sorted order.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Returns true when no tables are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
