// sqldiff-core/src/model/budget.rs
// ============================================================================
// Module: Statement Budget
// Description: Bounded or unbounded cap on executed statements.
// Purpose: Replace magic sentinel counts with an explicit tagged value.
// Dependencies: serde, std
// ============================================================================

//! ## Overview
//! A non-positive configured count means "run until the source is exhausted".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Cap on the number of statements a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementBudget {
    /// Execute at most this many statements.
    Bounded(NonZeroU64),
    /// Execute until the statement source is exhausted.
    Unbounded,
}

impl StatementBudget {
    /// Normalizes a configured count; zero and negative values mean unbounded.
    #[must_use]
    pub fn from_configured(value: i64) -> Self {
        u64::try_from(value).ok().and_then(NonZeroU64::new).map_or(Self::Unbounded, Self::Bounded)
    }

    /// Returns true when another statement may run after `executed` statements.
    #[must_use]
    pub const fn allows(self, executed: u64) -> bool {
        match self {
            Self::Bounded(limit) => executed < limit.get(),
            Self::Unbounded => true,
        }
    }

    /// Returns the statement limit, if any.
    #[must_use]
    pub const fn limit(self) -> Option<u64> {
        match self {
            Self::Bounded(limit) => Some(limit.get()),
            Self::Unbounded => None,
        }
    }
}

impl fmt::Display for StatementBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(limit) => write!(f, "{limit}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
