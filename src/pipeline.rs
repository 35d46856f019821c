//! One sweep, start to finish:
//! normalize -> intra-target guard -> cross-folder detection -> selection -> relocation -> summary.
//!
//! Every stage either hands its output to the next one or stops the run with a `SweepError`.
//! Per-file relocation failures are not errors here; they end up in the `Summary`.

use tracing::{debug, info};

use crate::config::Config;
use crate::detect::{DuplicateFinder, detect, ensure_no_internal_duplicates};
use crate::errors::SweepError;
use crate::normalize::normalize_path;
use crate::relocate::{Destination, Facility, RelocationEngine, select_target_files};
use crate::summary::Summary;

/// Run a sweep for a validated `cfg`, relocating through the platform facility.
pub fn run(cfg: &Config, finder: &dyn DuplicateFinder) -> Result<Summary, SweepError> {
    run_with(cfg, finder, Facility::acquire)
}

/// Like `run`, with the facility acquisition supplied by the caller.
/// `acquire` is only called when at least one file is about to be relocated.
pub fn run_with<A>(cfg: &Config, finder: &dyn DuplicateFinder, acquire: A) -> Result<Summary, SweepError>
where
    A: FnOnce(&Destination) -> Facility,
{
    let reference = normalize_path(&cfg.reference_dir)?;
    let target = normalize_path(&cfg.target_dir)?;
    debug!(reference = reference.as_str(), target = target.as_str(), "Directories normalized");

    ensure_no_internal_duplicates(finder, &cfg.target_dir)?;

    let report = detect(
        finder,
        &[cfg.reference_dir.as_path(), cfg.target_dir.as_path()],
        &cfg.report_file,
    )?;
    info!(
        groups = report.group_count(),
        files = report.file_count(),
        report = %cfg.report_file.display(),
        "Cross-folder duplicate report loaded"
    );

    let selected = select_target_files(report, &target);
    info!(files = selected.len(), bytes = selected.total_bytes(), "Target-side duplicates selected");

    let destination = cfg.destination();
    let mut engine = RelocationEngine::new(cfg.engine_settings());
    let outcome = engine.run(selected, || acquire(&destination));

    Ok(Summary::from_run(&outcome, &cfg.report_file))
}
