//! Core configuration types.
//! - Config holds runtime settings with defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::detect::{DEFAULT_ENGINE, EngineCommand, HashType};
use crate::relocate::{Destination, EngineSettings};

use super::{DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_MS, DEFAULT_REPORT_FILE};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim()).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory whose files are kept
    pub reference_dir: PathBuf,
    /// Directory whose duplicates are relocated
    pub target_dir: PathBuf,
    /// Move duplicates here instead of the trash
    pub holding_dir: Option<PathBuf>,
    /// Where the finder writes its JSON report (kept for audit)
    pub report_file: PathBuf,
    /// Finder executable
    pub engine: PathBuf,
    pub hash_type: HashType,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    /// Report what would be relocated without touching anything
    pub dry_run: bool,
    /// Items per progress batch
    pub batch_size: usize,
    /// Pause between batches while the trash is in use
    pub pause_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::new(),
            target_dir: PathBuf::new(),
            holding_dir: None,
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
            engine: PathBuf::from(DEFAULT_ENGINE),
            hash_type: HashType::default(),
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

impl Config {
    /// Config with explicit reference/target directories; other fields use defaults.
    pub fn new(reference_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
            target_dir: target_dir.into(),
            ..Default::default()
        }
    }

    pub fn destination(&self) -> Destination {
        match &self.holding_dir {
            Some(dir) => Destination::HoldingDir(dir.clone()),
            None => Destination::Trash,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            dry_run: self.dry_run,
            batch_size: self.batch_size.max(1),
            pause: Duration::from_millis(self.pause_ms),
        }
    }

    /// Finder invocation for this config; dry runs ask the finder to simulate too.
    pub fn engine_command(&self) -> EngineCommand {
        EngineCommand::new(self.engine.clone(), self.hash_type).simulate(self.dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parse_aliases() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!(" normal ".parse::<LogLevel>().is_ok());
    }

    #[test]
    fn destination_follows_holding_dir() {
        let mut cfg = Config::new("/ref", "/tgt");
        assert_eq!(cfg.destination(), Destination::Trash);
        cfg.holding_dir = Some("/hold".into());
        assert_eq!(cfg.destination(), Destination::HoldingDir("/hold".into()));
    }

    #[test]
    fn engine_settings_coerce_zero_batch() {
        let mut cfg = Config::new("/ref", "/tgt");
        cfg.batch_size = 0;
        cfg.pause_ms = 250;
        let s = cfg.engine_settings();
        assert_eq!(s.batch_size, 1);
        assert_eq!(s.pause, Duration::from_millis(250));
    }

    #[test]
    fn dry_run_makes_finder_simulate() {
        let mut cfg = Config::new("/ref", "/tgt");
        assert!(!cfg.engine_command().simulate);
        cfg.dry_run = true;
        assert!(cfg.engine_command().simulate);
    }
}
