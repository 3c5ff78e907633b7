// sqldiff-core/src/runtime/diff.rs
// ============================================================================
// Module: Outcome Text Diff
// Description: Character-level alignment of two canonical outcome texts.
// Purpose: Show reviewers exactly where two endpoints disagree.
// Dependencies: serde, similar
// ============================================================================

//! ## Overview
//! [`TextDiff`] aligns endpoint 1's text (left) with endpoint 2's text
//! (right) using a longest-common-subsequence edit script. Adjacent changes of
//! the same kind are merged into one [`DiffSegment`].
//!
//! ## Invariants
//! - Equal + deleted segments, in order, reconstruct the left text exactly.
//! - Equal + inserted segments, in order, reconstruct the right text exactly.
//! - Both hold for every [`DiffStyle`] once annotation markers are removed,
//!   and still hold when a deadline cuts the alignment short.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use similar::Algorithm;
use similar::ChangeTag;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// ANSI foreground red, used for deletions.
pub const ANSI_RED: &str = "\u{1b}[31m";
/// ANSI foreground green, used for insertions.
pub const ANSI_GREEN: &str = "\u{1b}[32m";
/// ANSI attribute reset.
pub const ANSI_RESET: &str = "\u{1b}[0m";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Annotation style for rendered diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStyle {
    /// No annotation; both sides render as their raw text.
    Plain,
    /// Deletions in red, insertions in green, via inline ANSI markers.
    #[default]
    Ansi,
}

/// Kind of a diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Present on both sides.
    Equal,
    /// Present only on the left (endpoint 1).
    Delete,
    /// Present only on the right (endpoint 2).
    Insert,
}

impl From<ChangeTag> for SegmentKind {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => Self::Equal,
            ChangeTag::Delete => Self::Delete,
            ChangeTag::Insert => Self::Insert,
        }
    }
}

/// A maximal run of text sharing one [`SegmentKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSegment {
    /// Segment kind.
    pub kind: SegmentKind,
    /// Segment text.
    pub text: String,
}

/// Edit script from the left text to the right text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDiff {
    /// Segments in edit-script order.
    segments: Vec<DiffSegment>,
}

// ============================================================================
// SECTION: Diff
// ============================================================================

impl TextDiff {
    /// Computes the diff without a deadline.
    #[must_use]
    pub fn compute(left: &str, right: &str) -> Self {
        Self::compute_with_timeout(left, right, None)
    }

    /// Computes the diff, giving up on optimality once `timeout` elapses.
    #[must_use]
    pub fn compute_with_timeout(left: &str, right: &str, timeout: Option<Duration>) -> Self {
        let mut config = similar::TextDiff::configure();
        config.algorithm(Algorithm::Myers);
        if let Some(timeout) = timeout {
            config.timeout(timeout);
        }
        let diff = config.diff_chars(left, right);
        let mut segments: Vec<DiffSegment> = Vec::new();
        for change in diff.iter_all_changes() {
            let kind = SegmentKind::from(change.tag());
            match segments.last_mut() {
                Some(last) if last.kind == kind => last.text.push_str(change.value()),
                _ => segments.push(DiffSegment {
                    kind,
                    text: change.value().to_string(),
                }),
            }
        }
        Self {
            segments,
        }
    }

    /// Returns the merged segments.
    #[must_use]
    pub fn segments(&self) -> &[DiffSegment] {
        &self.segments
    }

    /// Returns true when both texts are identical.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.segments.iter().all(|segment| segment.kind == SegmentKind::Equal)
    }

    /// Reconstructs the left text from equal and deleted segments.
    #[must_use]
    pub fn left_text(&self) -> String {
        self.collect_side(SegmentKind::Delete)
    }

    /// Reconstructs the right text from equal and inserted segments.
    #[must_use]
    pub fn right_text(&self) -> String {
        self.collect_side(SegmentKind::Insert)
    }

    /// Renders both sides with the requested annotation style.
    #[must_use]
    pub fn render(&self, style: DiffStyle) -> (String, String) {
        let mut left = String::new();
        let mut right = String::new();
        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Equal => {
                    left.push_str(&segment.text);
                    right.push_str(&segment.text);
                }
                SegmentKind::Delete => push_marked(&mut left, &segment.text, style, ANSI_RED),
                SegmentKind::Insert => push_marked(&mut right, &segment.text, style, ANSI_GREEN),
            }
        }
        (left, right)
    }

    /// Concatenates equal segments with segments of the given side kind.
    fn collect_side(&self, side: SegmentKind) -> String {
        self.segments
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Equal || segment.kind == side)
            .map(|segment| segment.text.as_str())
            .collect()
    }
}

/// Appends `text`, wrapped in `color` when the style annotates.
fn push_marked(out: &mut String, text: &str, style: DiffStyle, color: &str) {
    match style {
        DiffStyle::Plain => out.push_str(text),
        DiffStyle::Ansi => {
            out.push_str(color);
            out.push_str(text);
            out.push_str(ANSI_RESET);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
