// sqldiff-core/src/runtime/verdict.rs
// ============================================================================
// Module: Consistency Verdict
// Description: Judges whether two endpoint outcomes agree.
// Purpose: Decide, per statement, whether a divergence must be recorded.
// Dependencies: crate::model, serde
// ============================================================================

//! ## Overview
//! Both outcomes are compared through their canonical text. In
//! [`CompareMode::Unordered`] row lists are compared as multisets; in
//! [`CompareMode::Ordered`] they must match row by row, so a single row that
//! contains a newline never equals two rows.
//!
//! ## Invariants
//! - Rows on one side and an error on the other always diverge.
//! - Two errors agree exactly when their messages are equal.
//! - Execution is never retried; the verdict sees the first outcome only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::Outcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Row ordering sensitivity of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Rows compare as an unordered multiset.
    #[default]
    Unordered,
    /// Rows compare in order.
    Ordered,
}

impl CompareMode {
    /// Maps the `--order` flag onto a comparison mode.
    #[must_use]
    pub const fn from_order_flag(order: bool) -> Self {
        if order { Self::Ordered } else { Self::Unordered }
    }

    /// Returns the snake-case label of the mode.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unordered => "unordered",
            Self::Ordered => "ordered",
        }
    }
}

/// Result of comparing two outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Outcomes agree.
    Consistent,
    /// Outcomes disagree; the statement must be recorded.
    Divergent,
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Judges two outcomes of the same statement.
#[must_use]
pub fn judge(first: &Outcome, second: &Outcome, mode: CompareMode) -> Verdict {
    let consistent = match (first, second) {
        (Outcome::Rows(left), Outcome::Rows(right)) => match mode {
            CompareMode::Ordered => left.rows() == right.rows(),
            CompareMode::Unordered => left.len() == right.len() && left.sorted() == right.sorted(),
        },
        (Outcome::Error(left), Outcome::Error(right)) => left.message() == right.message(),
        _ => false,
    };
    if consistent { Verdict::Consistent } else { Verdict::Divergent }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn reordered_rows_agree_only_when_unordered() {
        let first = Outcome::rows(["a", "b"]);
        let second = Outcome::rows(["b", "a"]);
        assert_eq!(judge(&first, &second, CompareMode::Unordered), Verdict::Consistent);
        assert_eq!(judge(&first, &second, CompareMode::Ordered), Verdict::Divergent);
    }

    #[test]
    fn duplicate_counts_matter_in_multiset_mode() {
        let first = Outcome::rows(["a", "a", "b"]);
        let second = Outcome::rows(["a", "b", "b"]);
        assert_eq!(judge(&first, &second, CompareMode::Unordered), Verdict::Divergent);
    }

    #[test]
    fn error_against_rows_diverges() {
        let first = Outcome::error("syntax error");
        let second = Outcome::rows(Vec::<String>::new());
        assert_eq!(judge(&first, &second, CompareMode::Unordered), Verdict::Divergent);
        assert_eq!(judge(&second, &first, CompareMode::Ordered), Verdict::Divergent);
    }

    #[test]
    fn errors_compare_by_message() {
        let first = Outcome::error("no such table: t");
        assert_eq!(
            judge(&first, &Outcome::error("no such table: t"), CompareMode::Ordered),
            Verdict::Consistent
        );
        assert_eq!(
            judge(&first, &Outcome::error("no such column: c"), CompareMode::Ordered),
            Verdict::Divergent
        );
    }

    #[test]
    fn order_flag_maps_to_mode() {
        assert_eq!(CompareMode::from_order_flag(true), CompareMode::Ordered);
        assert_eq!(CompareMode::from_order_flag(false), CompareMode::Unordered);
    }

    proptest! {
        #[test]
        fn permutations_are_consistent_unordered(
            rows in proptest::collection::vec("[a-c]{0,3}", 0..8),
            rotate in 0usize..8,
        ) {
            let mut shuffled = rows.clone();
            if !shuffled.is_empty() {
                let shift = rotate % shuffled.len();
                shuffled.rotate_left(shift);
            }
            let first = Outcome::rows(rows);
            let second = Outcome::rows(shuffled);
            prop_assert_eq!(judge(&first, &second, CompareMode::Unordered), Verdict::Consistent);
        }
    }
}
