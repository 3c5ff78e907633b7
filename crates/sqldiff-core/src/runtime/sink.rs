// sqldiff-core/src/runtime/sink.rs
// ============================================================================
// Module: Dump Directory Sink
// Description: Persists divergence reports as `<sequence>.log` files.
// Purpose: Keep one durable, write-once artifact per divergence.
// Dependencies: crate::{interfaces, model, runtime::report}, std::fs
// ============================================================================

//! ## Overview
//! [`DumpDirectory`] reserves the output location up front and refuses any
//! path that already exists, so artifacts from separate runs never mix. The
//! directory itself is only created when the loop starts, through
//! [`DivergenceSink::prepare`] on [`DumpSink`].
//!
//! ## Invariants
//! - Sequence numbers start at zero and advance only after a successful
//!   write, so the files on disk are dense.
//! - Report files are opened with `create_new`; an existing file is an error.
//! - The sequence counter is owned by the sink and mutated through `&mut self`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::interfaces::DivergenceSink;
use crate::interfaces::Observation;
use crate::interfaces::SinkError;
use crate::model::DivergenceRecord;
use crate::model::EndpointResult;
use crate::runtime::report::ReportOptions;
use crate::runtime::report::render_report;

// ============================================================================
// SECTION: Dump Directory
// ============================================================================

/// A reserved, not yet created, dump directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDirectory {
    /// Directory path.
    path: PathBuf,
}

impl DumpDirectory {
    /// Reserves `path`, failing when anything already exists there.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::AlreadyExists`] when the path exists, or
    /// [`SinkError::Io`] when its existence cannot be determined.
    pub fn reserve(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        match fs::symlink_metadata(&path) {
            Ok(_) => Err(SinkError::AlreadyExists {
                path,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self {
                path,
            }),
            Err(err) => Err(SinkError::Io {
                path,
                message: err.to_string(),
            }),
        }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the directory; its parents are created as needed.
    fn create(&self) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, &err))?;
        }
        fs::create_dir(&self.path).map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                SinkError::AlreadyExists {
                    path: self.path.clone(),
                }
            } else {
                io_error(&self.path, &err)
            }
        })
    }
}

// ============================================================================
// SECTION: Dump Sink
// ============================================================================

/// Divergence sink writing one report file per divergence.
#[derive(Debug)]
pub struct DumpSink {
    /// Reserved output directory.
    directory: DumpDirectory,
    /// Report rendering options.
    options: ReportOptions,
    /// Next sequence number to allocate.
    next_sequence: u64,
    /// Set once the directory has been created.
    prepared: bool,
}

impl DumpSink {
    /// Creates a sink over a reserved directory.
    #[must_use]
    pub const fn new(directory: DumpDirectory, options: ReportOptions) -> Self {
        Self {
            directory,
            options,
            next_sequence: 0,
            prepared: false,
        }
    }

    /// Returns the dump directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.directory.path()
    }

    /// Returns the number of divergences written so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.next_sequence
    }
}

impl DivergenceSink for DumpSink {
    fn prepare(&mut self) -> Result<(), SinkError> {
        self.directory.create()?;
        self.prepared = true;
        Ok(())
    }

    fn record(
        &mut self,
        sql: &str,
        first: Observation<'_>,
        second: Observation<'_>,
    ) -> Result<DivergenceRecord, SinkError> {
        if !self.prepared {
            return Err(SinkError::NotPrepared);
        }
        let record = DivergenceRecord::new(
            self.next_sequence,
            sql,
            owned_result(first),
            owned_result(second),
        );
        let report = render_report(&record, &self.options);
        let path = self.directory.path().join(record.file_name());
        write_new_file(&path, report.as_bytes())?;
        self.next_sequence += 1;
        Ok(record)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Copies a borrowed observation into an owned endpoint result.
fn owned_result(observation: Observation<'_>) -> EndpointResult {
    EndpointResult {
        label: observation.label.to_string(),
        outcome: observation.outcome.clone(),
    }
}

/// Writes `bytes` to a file that must not exist yet, then syncs it.
fn write_new_file(path: &Path, bytes: &[u8]) -> Result<(), SinkError> {
    let mut file =
        OpenOptions::new().write(true).create_new(true).open(path).map_err(|err| io_error(path, &err))?;
    file.write_all(bytes).map_err(|err| io_error(path, &err))?;
    file.sync_all().map_err(|err| io_error(path, &err))
}

/// Builds a [`SinkError::Io`] for `path`.
fn io_error(path: &Path, err: &std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
