// sqldiff-generate/src/template.rs
// ============================================================================
// Module: Template Source
// Description: Seeded, key-aware expansion of statement templates.
// Purpose: Produce an unbounded, reproducible stream of schema-valid SQL.
// Dependencies: rand, sqldiff-core
// ============================================================================

//! ## Overview
//! A template file holds `;`-separated statements with placeholders:
//! - `{table}` names the current table. The first `{table}` keeps a table
//!   already chosen by an earlier `{column}`; later ones pick a new table.
//! - `{column}` picks a column of the current table, choosing a table first
//!   when none is current yet.
//! - `{int}` picks an integer in [`INT_RANGE`].
//!
//! Any other `{identifier}` is rejected when the source opens. Braces that do
//! not enclose an identifier are literal text.
//!
//! ## Invariants
//! - The same seed, templates, and key set produce the same statement stream.
//! - The source never reports exhaustion unless it has no templates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::RangeInclusive;
use std::path::PathBuf;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sqldiff_core::KeySet;
use sqldiff_core::SourceError;
use sqldiff_core::StatementSource;
use sqldiff_core::StatementSourceFactory;

use crate::input::read_script;
use crate::split::split_statements;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Range sampled by the `{int}` placeholder.
pub const INT_RANGE: RangeInclusive<i64> = -10..=100;

// ============================================================================
// SECTION: Templates
// ============================================================================

/// Placeholder kinds recognized in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{table}`
    Table,
    /// `{column}`
    Column,
    /// `{int}`
    Int,
}

impl Placeholder {
    /// Maps a placeholder name to its kind.
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "table" => Some(Self::Table),
            "column" => Some(Self::Column),
            "int" => Some(Self::Int),
            _ => None,
        }
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim.
    Literal(String),
    /// Text chosen at expansion time.
    Placeholder(Placeholder),
}

/// A parsed statement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Ordered segments.
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `text` into literal and placeholder segments.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Invalid`] for an unknown `{identifier}`.
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let candidate = after.find('}').map(|close| &after[..close]);
            match candidate {
                Some(name) if is_identifier(name) => {
                    let placeholder = Placeholder::from_name(name).ok_or_else(|| {
                        SourceError::Invalid(format!("unknown placeholder {{{name}}} in: {text}"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                    rest = &after[name.len() + 1..];
                }
                _ => {
                    literal.push('{');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            segments,
        })
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true when expansion needs at least one table.
    #[must_use]
    pub fn needs_keys(&self) -> bool {
        self.segments.iter().any(|segment| {
            matches!(
                segment,
                Segment::Placeholder(Placeholder::Table | Placeholder::Column)
            )
        })
    }
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Factory opening a seeded template stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSourceFactory {
    /// Path of the template file.
    path: PathBuf,
    /// Expansion seed.
    seed: u64,
}

impl TemplateSourceFactory {
    /// Creates a factory for the template file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            path: path.into(),
            seed,
        }
    }
}

impl StatementSourceFactory for TemplateSourceFactory {
    type Source = TemplateSource;

    fn open(&mut self, keys: &KeySet) -> Result<TemplateSource, SourceError> {
        let script = read_script(&self.path)?;
        let templates = split_statements(&script)
            .iter()
            .map(|text| Template::parse(text))
            .collect::<Result<Vec<_>, _>>()?;
        TemplateSource::new(templates, keys, self.seed)
    }
}

// ============================================================================
// SECTION: Source
// ============================================================================

/// Unbounded source expanding randomly chosen templates.
#[derive(Debug)]
pub struct TemplateSource {
    /// Parsed templates.
    templates: Vec<Template>,
    /// Tables and their columns, in stable order.
    tables: Vec<(String, Vec<String>)>,
    /// Seeded generator.
    rng: StdRng,
}

impl TemplateSource {
    /// Creates a source over parsed templates and a key set.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Invalid`] when a template references tables or
    /// columns but `keys` has no usable table.
    pub fn new(templates: Vec<Template>, keys: &KeySet, seed: u64) -> Result<Self, SourceError> {
        let tables: Vec<(String, Vec<String>)> = keys
            .table_names()
            .into_iter()
            .filter_map(|table| {
                keys.columns(table)
                    .filter(|columns| !columns.is_empty())
                    .map(|columns| (table.to_string(), columns.to_vec()))
            })
            .collect();
        if tables.is_empty() && templates.iter().any(Template::needs_keys) {
            return Err(SourceError::Invalid(
                "templates reference {table} or {column} but no tables are known".to_string(),
            ));
        }
        Ok(Self {
            templates,
            tables,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Expands one template.
    fn expand(&mut self, template_index: usize) -> String {
        let mut current: Option<usize> = None;
        let mut table_named = false;
        let mut out = String::new();
        for segment in &self.templates[template_index].segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(Placeholder::Table) => {
                    let table = match current {
                        Some(table) if !table_named => table,
                        _ => self.rng.gen_range(0..self.tables.len()),
                    };
                    current = Some(table);
                    table_named = true;
                    out.push_str(&self.tables[table].0);
                }
                Segment::Placeholder(Placeholder::Column) => {
                    let table = match current {
                        Some(table) => table,
                        None => {
                            let table = self.rng.gen_range(0..self.tables.len());
                            current = Some(table);
                            table
                        }
                    };
                    let columns = &self.tables[table].1;
                    let column = self.rng.gen_range(0..columns.len());
                    out.push_str(&columns[column]);
                }
                Segment::Placeholder(Placeholder::Int) => {
                    out.push_str(&self.rng.gen_range(INT_RANGE).to_string());
                }
            }
        }
        out
    }
}

impl StatementSource for TemplateSource {
    fn next_statement(&mut self) -> Result<Option<String>, SourceError> {
        if self.templates.is_empty() {
            return Ok(None);
        }
        let index = self.rng.gen_range(0..self.templates.len());
        Ok(Some(self.expand(index)))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
