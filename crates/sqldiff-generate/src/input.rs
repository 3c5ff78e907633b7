// sqldiff-generate/src/input.rs
// ============================================================================
// Module: Script Input
// Description: Bounded, UTF-8 checked reads of script files.
// Purpose: Load DDL, statement, and template files with size limits.
// Dependencies: sqldiff-core, thiserror
// ============================================================================

//! ## Overview
//! Script files are read whole. Files larger than [`MAX_SCRIPT_BYTES`] or not
//! valid UTF-8 are rejected before any statement is produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use sqldiff_core::GenerateError;
use sqldiff_core::SourceError;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum script file size in bytes.
pub const MAX_SCRIPT_BYTES: u64 = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Script read failures.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// The file exceeds the size limit.
    #[error("refusing to read {path}: {size} bytes exceeds limit of {limit}")]
    TooLarge {
        /// File path.
        path: String,
        /// Actual size.
        size: u64,
        /// Limit in bytes.
        limit: u64,
    },
    /// The file is not UTF-8.
    #[error("{path} is not valid utf-8")]
    NotUtf8 {
        /// File path.
        path: String,
    },
}

impl From<InputError> for GenerateError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Io {
                ..
            } => Self::Io(err.to_string()),
            InputError::TooLarge {
                ..
            }
            | InputError::NotUtf8 {
                ..
            } => Self::Invalid(err.to_string()),
        }
    }
}

impl From<InputError> for SourceError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Io {
                ..
            } => Self::Io(err.to_string()),
            InputError::TooLarge {
                ..
            }
            | InputError::NotUtf8 {
                ..
            } => Self::Invalid(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads a script file as UTF-8 text.
///
/// # Errors
///
/// Returns [`InputError`] when the file is unreadable, too large, or not
/// UTF-8.
pub fn read_script(path: &Path) -> Result<String, InputError> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|err| InputError::Io {
        path: display.clone(),
        message: err.to_string(),
    })?;
    if metadata.len() > MAX_SCRIPT_BYTES {
        return Err(InputError::TooLarge {
            path: display,
            size: metadata.len(),
            limit: MAX_SCRIPT_BYTES,
        });
    }
    let bytes = fs::read(path).map_err(|err| InputError::Io {
        path: display.clone(),
        message: err.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|_| InputError::NotUtf8 {
        path: display,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
