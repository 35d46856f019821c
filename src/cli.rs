//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - CLI flags override values from config.xml.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::detect::HashType;

/// Relocate files in a target directory that duplicate files in a reference directory.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Find files in a target folder that duplicate a reference folder and move them to the trash or a holding folder"
)]
pub struct Args {
    /// Directory whose files are kept.
    #[arg(long, short = 'r', value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub reference: Option<PathBuf>,

    /// Directory whose duplicates of reference files are relocated.
    #[arg(long, short = 't', value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub target: Option<PathBuf>,

    /// Move duplicates into this directory instead of the trash.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub holding_dir: Option<PathBuf>,

    /// Where the duplicate finder writes its JSON report.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub report_file: Option<PathBuf>,

    /// Duplicate finder executable.
    #[arg(long, value_name = "PROGRAM", value_hint = ValueHint::ExecutablePath)]
    pub engine: Option<PathBuf>,

    /// Hash used by the finder: blake3, crc32 or xxh3.
    #[arg(long, value_name = "HASH")]
    pub hash_type: Option<HashType>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print where the config file is looked up (or DUPE_SWEEP_CONFIG if set), then exit.
    #[arg(long, help = "Print the config file location and exit")]
    pub print_config: bool,

    /// Write a commented template config to the config location, then exit.
    #[arg(long, help = "Write a template config file and exit")]
    pub init_config: bool,

    /// Dry-run: list what would be relocated but do not modify the filesystem.
    #[arg(long, help = "Show what would be relocated, but do not touch any file")]
    pub dry_run: bool,

    /// Items per progress batch.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Pause between batches while using the trash, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub pause_ms: Option<u64>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(r) = &self.reference {
            cfg.reference_dir = r.clone();
        }
        if let Some(t) = &self.target {
            cfg.target_dir = t.clone();
        }
        if let Some(h) = &self.holding_dir {
            cfg.holding_dir = Some(h.clone());
        }
        if let Some(r) = &self.report_file {
            cfg.report_file = r.clone();
        }
        if let Some(e) = &self.engine {
            cfg.engine = e.clone();
        }
        if let Some(h) = self.hash_type {
            cfg.hash_type = h;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(f) = &self.log_file {
            cfg.log_file = Some(f.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if let Some(n) = self.batch_size {
            cfg.batch_size = n.max(1);
        }
        if let Some(ms) = self.pause_ms {
            cfg.pause_ms = ms;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
