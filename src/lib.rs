//! Core library for `dupe_sweep`.
//!
//! Finds files in a target directory that duplicate files in a reference directory, using
//! an external duplicate finder as the source of truth, and relocates the target-side
//! copies to the trash or a holding directory.
//!
//! Module layout:
//! - `normalize`: directory normalization and case/separator-insensitive containment
//! - `detect`: finder invocation, report ingestion and the intra-target guard
//! - `relocate`: target-side selection and the sequential relocation engine
//! - `summary`: end-of-run accounting
//! - `pipeline`: the stages wired together
//! - `config`, `cli`, `platform`, `output`, `errors`: ambient plumbing

pub mod cli;
pub mod config;
pub mod detect;
pub mod errors;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod relocate;
pub mod summary;

pub use config::types::{Config, LogLevel};
pub use config::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use detect::{DuplicateFinder, DuplicateReport, EngineCommand, HashType};
pub use errors::{RelocateError, SweepError};
pub use normalize::{NormalizedDir, comparison_key, normalize_dir};
pub use relocate::{Destination, Facility, ItemOutcome, RelocationEngine};
pub use summary::Summary;
