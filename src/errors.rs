//! Typed error definitions for dupe_sweep.
//! `SweepError` covers conditions that stop a run; `RelocateError` covers a single
//! file that could not be relocated (counted, never fatal).

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::relocate::helpers::describe_io_error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Directory path is empty")]
    EmptyPath,

    #[error(
        "Target directory {dir} contains {files} file(s) in {groups} duplicate group(s) of its own; \
         resolve these duplicates inside the target first, then re-run"
    )]
    IntraTargetDuplicates {
        dir: PathBuf,
        groups: usize,
        files: usize,
    },

    #[error("Failed to launch duplicate finder '{program}': {source}")]
    EngineLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Duplicate report {path} could not be read: {source}")]
    ReportUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot create a temporary report location: {0}")]
    TempReport(#[source] io::Error),

    #[error("Duplicate report {path} is not valid JSON: {source}")]
    ReportMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SweepError {
    /// Stable numeric code used in structured logs.
    pub fn code(&self) -> u16 {
        match self {
            SweepError::InvalidConfig(_) => 10,
            SweepError::EmptyPath => 11,
            SweepError::IntraTargetDuplicates { .. } => 20,
            SweepError::EngineLaunch { .. } => 30,
            SweepError::ReportUnreadable { .. } => 31,
            SweepError::ReportMalformed { .. } => 32,
            SweepError::TempReport(_) => 33,
        }
    }

    /// Short machine-friendly label.
    pub fn kind(&self) -> &'static str {
        match self {
            SweepError::InvalidConfig(_) => "invalid_config",
            SweepError::EmptyPath => "empty_path",
            SweepError::IntraTargetDuplicates { .. } => "intra_target_duplicates",
            SweepError::EngineLaunch { .. } => "engine_launch",
            SweepError::ReportUnreadable { .. } => "report_unreadable",
            SweepError::ReportMalformed { .. } => "report_malformed",
            SweepError::TempReport(_) => "temp_report",
        }
    }
}

/// Why a single file could not be relocated.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("file is in use by another process: {0}")]
    InUse(PathBuf),

    #[error("{message}")]
    Io { path: PathBuf, message: String },

    #[error("trash operation failed for {path}: {message}")]
    Trash { path: PathBuf, message: String },
}

impl RelocateError {
    /// Classify an I/O error raised while handling `path`.
    pub fn from_io(op: &str, path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => RelocateError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => RelocateError::PermissionDenied(path.to_path_buf()),
            _ if is_in_use(&e) => RelocateError::InUse(path.to_path_buf()),
            _ => RelocateError::Io {
                path: path.to_path_buf(),
                message: describe_io_error(op, path, &e),
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            RelocateError::NotFound(p)
            | RelocateError::PermissionDenied(p)
            | RelocateError::InUse(p)
            | RelocateError::Io { path: p, .. }
            | RelocateError::Trash { path: p, .. } => p,
        }
    }
}

#[cfg(unix)]
fn is_in_use(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(code) if code == libc::EBUSY || code == libc::ETXTBSY)
}

#[cfg(windows)]
fn is_in_use(e: &io::Error) -> bool {
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    matches!(e.raw_os_error(), Some(32) | Some(33))
}

#[cfg(not(any(unix, windows)))]
fn is_in_use(_e: &io::Error) -> bool {
    false
}
