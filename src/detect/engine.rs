//! Invocation of the external duplicate finder.
//!
//! The finder is a black box: it receives directories, a hash algorithm and a report
//! destination, and writes a JSON report. Its console output is kept for diagnostics
//! only; the report file is the single source of truth.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::errors::SweepError;

use super::report::{DuplicateReport, ingest};

/// Default finder executable, looked up on PATH.
pub const DEFAULT_ENGINE: &str = "czkawka_cli";

/// Hash algorithms understood by the finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashType {
    #[default]
    Blake3,
    Crc32,
    Xxh3,
}

impl HashType {
    pub fn as_arg(&self) -> &'static str {
        match self {
            HashType::Blake3 => "BLAKE3",
            HashType::Crc32 => "CRC32",
            HashType::Xxh3 => "XXH3",
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_arg().to_ascii_lowercase())
    }
}

impl FromStr for HashType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(HashType::Blake3),
            "crc32" => Ok(HashType::Crc32),
            "xxh3" => Ok(HashType::Xxh3),
            _ => Err(format!("invalid hash type: '{s}' (expected blake3, crc32 or xxh3)")),
        }
    }
}

/// Something that can search `dirs` for duplicates and write a report to `report`.
///
/// Implementations must not treat "duplicates found" as an error; only a failure to run
/// the search at all is an `Err`.
pub trait DuplicateFinder {
    fn find(&self, dirs: &[&Path], report: &Path) -> Result<(), SweepError>;
}

/// The real finder, run as a child process.
#[derive(Debug, Clone)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub hash_type: HashType,
    /// Pass the finder's own "simulate only" flag.
    pub simulate: bool,
}

impl EngineCommand {
    pub fn new(program: impl Into<PathBuf>, hash_type: HashType) -> Self {
        Self {
            program: program.into(),
            hash_type,
            simulate: false,
        }
    }

    pub fn simulate(mut self, on: bool) -> Self {
        self.simulate = on;
        self
    }

    /// Arguments for a content-hash duplicate search writing a JSON report.
    pub fn args_for(&self, dirs: &[&Path], report: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = vec!["dup".into()];
        for d in dirs {
            args.push("-d".into());
            args.push(d.as_os_str().to_owned());
        }
        for a in ["-s", "hash", "-t", self.hash_type.as_arg(), "-p"] {
            args.push(a.into());
        }
        args.push(report.as_os_str().to_owned());
        if self.simulate {
            args.push("-Q".into());
        }
        args
    }
}

impl DuplicateFinder for EngineCommand {
    fn find(&self, dirs: &[&Path], report: &Path) -> Result<(), SweepError> {
        let args = self.args_for(dirs, report);
        debug!(program = %self.program.display(), ?args, "Launching duplicate finder");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| SweepError::EngineLaunch {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(stdout = %stdout.trim(), stderr = %stderr.trim(), "Duplicate finder console output");

        if !output.status.success() {
            // Some finders signal "duplicates found" through a non-zero status.
            let excerpt: String = stderr.lines().take(5).collect::<Vec<_>>().join(" | ");
            warn!(
                status = ?output.status.code(),
                stderr = %excerpt,
                "Duplicate finder exited with a non-zero status; relying on its report file"
            );
        }
        Ok(())
    }
}

/// Run `finder` over `dirs` and ingest the report it leaves at `report_path`.
///
/// A stale report at `report_path` is removed first so that a missing file after the
/// search reliably means "no duplicates". The new report is left in place for audit.
pub fn detect(
    finder: &dyn DuplicateFinder,
    dirs: &[&Path],
    report_path: &Path,
) -> Result<DuplicateReport, SweepError> {
    match fs::remove_file(report_path) {
        Ok(()) => debug!(report = %report_path.display(), "Removed stale duplicate report"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SweepError::ReportUnreadable {
                path: report_path.to_path_buf(),
                source,
            });
        }
    }

    info!(dirs = ?dirs, report = %report_path.display(), "Searching for duplicates");
    finder.find(dirs, report_path)?;

    let bytes = match fs::read(report_path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(report = %report_path.display(), "Duplicate finder wrote no report; no duplicates");
            return Ok(DuplicateReport::default());
        }
        Err(source) => {
            return Err(SweepError::ReportUnreadable {
                path: report_path.to_path_buf(),
                source,
            });
        }
    };
    ingest(&bytes, report_path)
}
