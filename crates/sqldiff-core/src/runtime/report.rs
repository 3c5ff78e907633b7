// sqldiff-core/src/runtime/report.rs
// ============================================================================
// Module: Divergence Report
// Description: Textual layout of one divergence artifact.
// Purpose: Produce a self-contained, human-reviewable report per divergence.
// Dependencies: crate::{model, runtime::diff}
// ============================================================================

//! ## Overview
//! A report has three sections in fixed order: `[sql]`, `[err]`, `[compare]`.
//! Each section header sits on its own line followed by a blank line, and each
//! content block is terminated by a blank line. Per-endpoint entries start
//! with a `[[<label>]]` tag line. The `[err]` entry of an endpoint that did not
//! fail is the bare tag.
//!
//! When both outcomes render to the same canonical text (for example no rows
//! against one empty row), each `[compare]` block gains a `-- <n> rows` line
//! so the difference stays visible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::model::DivergenceRecord;
use crate::model::EndpointResult;
use crate::model::Outcome;
use crate::runtime::diff::DiffStyle;
use crate::runtime::diff::TextDiff;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Rendering options injected into the divergence sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Annotation style for the `[compare]` section.
    pub style: DiffStyle,
    /// Optional time budget for the diff alignment.
    pub diff_timeout: Option<Duration>,
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the report text for a divergence record.
#[must_use]
pub fn render_report(record: &DivergenceRecord, options: &ReportOptions) -> String {
    let first = record.first();
    let second = record.second();
    let mut out = String::new();

    push_header(&mut out, "[sql]");
    push_block(&mut out, record.sql());

    push_header(&mut out, "[err]");
    push_error_entry(&mut out, first);
    push_error_entry(&mut out, second);

    push_header(&mut out, "[compare]");
    let mut first_text = first.outcome.canonical_text();
    let mut second_text = second.outcome.canonical_text();
    if first_text == second_text {
        append_row_count(&mut first_text, &first.outcome);
        append_row_count(&mut second_text, &second.outcome);
    }
    let diff = TextDiff::compute_with_timeout(&first_text, &second_text, options.diff_timeout);
    let (left, right) = diff.render(options.style);
    push_tag(&mut out, &first.label);
    push_block(&mut out, &left);
    push_tag(&mut out, &second.label);
    push_block(&mut out, &right);
    out
}

/// Writes a section header followed by a blank line.
fn push_header(out: &mut String, header: &str) {
    out.push_str(header);
    out.push_str("\n\n");
}

/// Writes an endpoint tag line followed by a blank line.
fn push_tag(out: &mut String, label: &str) {
    out.push_str("[[");
    out.push_str(label);
    out.push_str("]]\n\n");
}

/// Writes a content block terminated by a blank line.
fn push_block(out: &mut String, content: &str) {
    out.push_str(content);
    out.push_str("\n\n");
}

/// Appends a `-- <n> rows` line for row outcomes.
fn append_row_count(text: &mut String, outcome: &Outcome) {
    if let Outcome::Rows(rows) = outcome {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str("-- ");
        text.push_str(&rows.len().to_string());
        text.push_str(" rows");
    }
}

/// Writes one endpoint's `[err]` entry.
fn push_error_entry(out: &mut String, result: &EndpointResult) {
    push_tag(out, &result.label);
    if let Some(error) = result.outcome.execution_error() {
        push_block(out, error.message());
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: Outcome, second: Outcome) -> DivergenceRecord {
        DivergenceRecord::new(
            0,
            "SELECT v FROM t",
            EndpointResult {
                label: "db1".to_string(),
                outcome: first,
            },
            EndpointResult {
                label: "db2".to_string(),
                outcome: second,
            },
        )
    }

    #[test]
    fn plain_report_layout_is_exact() {
        let report = render_report(
            &record(Outcome::error("syntax error"), Outcome::rows(["1"])),
            &ReportOptions {
                style: DiffStyle::Plain,
                diff_timeout: None,
            },
        );
        let expected = "[sql]\n\nSELECT v FROM t\n\n[err]\n\n[[db1]]\n\nsyntax error\n\n[[db2]]\n\n\
                        [compare]\n\n[[db1]]\n\nsyntax error\n\n[[db2]]\n\n1\n\n";
        assert_eq!(report, expected);
    }

    #[test]
    fn sections_appear_in_order() {
        let divergence = record(Outcome::rows(["a", "b"]), Outcome::rows(["b", "a"]));
        let report = render_report(&divergence, &ReportOptions::default());
        let sql = report.find("[sql]");
        let err = report.find("[err]");
        let compare = report.find("[compare]");
        assert!(sql < err && err < compare);
        assert!(report.contains("\u{1b}[31m"));
        assert!(report.contains("\u{1b}[32m"));
    }

    #[test]
    fn identical_text_gets_row_counts() {
        let report = render_report(
            &record(Outcome::rows(Vec::<String>::new()), Outcome::rows([""])),
            &ReportOptions {
                style: DiffStyle::Plain,
                diff_timeout: None,
            },
        );
        let expected = "[compare]\n\n[[db1]]\n\n-- 0 rows\n\n[[db2]]\n\n-- 1 rows\n\n";
        assert!(report.ends_with(expected), "report: {report}");
    }

    #[test]
    fn distinct_text_has_no_row_counts() {
        let divergence = record(Outcome::rows(["a"]), Outcome::rows(["b"]));
        let report = render_report(&divergence, &ReportOptions::default());
        assert!(!report.contains("rows"));
    }
}
