//! Intra-target duplicate gate.
//!
//! Before the target is compared with the reference, it is searched on its own. Any
//! duplicate found there halts the run: two target files in one group cannot be told
//! apart from a cross-folder pair later on.

use std::path::Path;
use tracing::{debug, error, info};

use crate::errors::SweepError;

use super::engine::{DuplicateFinder, detect};

/// Search `dir` alone and fail with `IntraTargetDuplicates` if it holds any duplicate group.
///
/// The report for this search lives in a private temporary directory that is removed
/// when this function returns, on success and on every error path.
pub fn ensure_no_internal_duplicates(
    finder: &dyn DuplicateFinder,
    dir: &Path,
) -> Result<(), SweepError> {
    let scratch = tempfile::Builder::new()
        .prefix("dupe_sweep_guard.")
        .tempdir()
        .map_err(SweepError::TempReport)?;
    let report_path = scratch.path().join("target_only.json");
    debug!(dir = %dir.display(), report = %report_path.display(), "Checking target for internal duplicates");

    let report = detect(finder, &[dir], &report_path)?;

    if report.is_empty() {
        info!(dir = %dir.display(), "Target has no internal duplicates");
        return Ok(());
    }

    let groups = report.group_count();
    let files = report.file_count();
    for (n, group) in report.groups().enumerate().take(20) {
        let paths: Vec<String> = group.members.iter().map(|m| m.path.display().to_string()).collect();
        error!(group = n + 1, files = ?paths, "Duplicate group inside target");
    }
    Err(SweepError::IntraTargetDuplicates {
        dir: dir.to_path_buf(),
        groups,
        files,
    })
}
