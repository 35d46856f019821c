//! Sequential relocation of target-side duplicates.
//!
//! States: Idle -> Validating -> (DryRunReport | Committing) -> Done.
//! Items are handled one at a time in `TargetFileSet` order. A failure on one item is
//! recorded and the loop moves on. Batches only group progress output; the optional pause
//! between batches applies while the trash facility is in use.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_MS};
use crate::errors::RelocateError;
use crate::output as out;

use super::facility::{Facility, Relocated, RelocatorKind};
use super::select::TargetFileSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub dry_run: bool,
    pub batch_size: usize,
    pub pause: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Validating,
    DryRunReport,
    Committing,
    Done,
}

/// What happened to one file.
#[derive(Debug)]
pub enum ItemOutcome {
    /// In the trash (`dest` is `None`) or the holding directory.
    Moved { dest: Option<PathBuf> },
    /// Permanently deleted because the trash could not be enabled.
    DeletedViaFallback,
    Failed(RelocateError),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ItemOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct ItemResult {
    pub path: PathBuf,
    pub outcome: ItemOutcome,
}

/// Everything the engine did in one run. Built by `RelocationEngine::run` and not mutated after.
#[derive(Debug, Default)]
pub struct RelocationRun {
    pub dry_run: bool,
    /// Files that would be relocated (dry run) or were scheduled (commit).
    pub candidates: Vec<PathBuf>,
    pub items: Vec<ItemResult>,
    pub fallback: bool,
}

impl RelocationRun {
    pub fn attempted(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &RelocateError)> {
        self.items.iter().filter_map(|i| match &i.outcome {
            ItemOutcome::Failed(e) => Some((&i.path, e)),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct RelocationEngine {
    settings: EngineSettings,
    state: EngineState,
}

impl RelocationEngine {
    pub fn new(mut settings: EngineSettings) -> Self {
        settings.batch_size = settings.batch_size.max(1);
        Self {
            settings,
            state: EngineState::Idle,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    fn enter(&mut self, next: EngineState) {
        debug!(from = ?self.state, to = ?next, "Relocation engine state");
        self.state = next;
    }

    /// Process `files`. `acquire` is called at most once, and only when something is committed.
    pub fn run<F>(&mut self, files: TargetFileSet, acquire: F) -> RelocationRun
    where
        F: FnOnce() -> Facility,
    {
        self.enter(EngineState::Validating);
        let mut run = RelocationRun {
            dry_run: self.settings.dry_run,
            ..RelocationRun::default()
        };

        if files.is_empty() {
            info!("No target-side duplicates; nothing to relocate");
            self.enter(EngineState::Done);
            return run;
        }

        let paths = files.into_paths();
        if self.settings.dry_run {
            self.enter(EngineState::DryRunReport);
            for (n, p) in paths.iter().enumerate() {
                info!(item = n + 1, path = %p.display(), "Dry run: would relocate");
                out::print_user(&format!("[dry-run] would relocate {}", p.display()));
            }
            run.candidates = paths;
            self.enter(EngineState::Done);
            return run;
        }

        self.enter(EngineState::Committing);
        let mut facility = acquire();
        run.fallback = facility.is_fallback();
        let pause_between = facility.kind() == RelocatorKind::Trash && !self.settings.pause.is_zero();

        let total = paths.len();
        let batches = total.div_ceil(self.settings.batch_size);
        let mut done = 0usize;
        for (b, batch) in paths.chunks(self.settings.batch_size).enumerate() {
            if b > 0 && pause_between {
                thread::sleep(self.settings.pause);
            }
            for path in batch {
                done += 1;
                let outcome = match facility.relocate(path) {
                    Ok(Relocated::Moved { dest }) => {
                        match &dest {
                            Some(d) => info!(item = done, path = %path.display(), dest = %d.display(), "Moved"),
                            None => info!(item = done, path = %path.display(), "Moved to trash"),
                        }
                        ItemOutcome::Moved { dest }
                    }
                    Ok(Relocated::DeletedPermanently) => {
                        info!(item = done, path = %path.display(), "Deleted permanently (trash unavailable)");
                        ItemOutcome::DeletedViaFallback
                    }
                    Err(e) => {
                        warn!(item = done, path = %path.display(), error = %e, "Relocation failed; continuing");
                        ItemOutcome::Failed(e)
                    }
                };
                run.items.push(ItemResult {
                    path: path.clone(),
                    outcome,
                });
            }
            info!(batch = b + 1, batches, done, total, "Batch complete");
        }
        drop(facility);
        run.candidates = paths;
        self.enter(EngineState::Done);
        run
    }
}
