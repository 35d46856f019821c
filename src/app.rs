//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the interrupt handler, validates
//! paths, and runs the sweep pipeline.

use anyhow::{Context, Result};
use std::process;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use dupe_sweep::cli::Args;
use dupe_sweep::config::{
    CONFIG_ENV, create_template_config, effective_config_path, explicit_config_path, load_config,
    validate_and_normalize,
};
use dupe_sweep::output as out;
use dupe_sweep::{SweepError, pipeline};

use crate::logging::init_tracing;

/// Exit code used after an interrupt (128 + SIGINT).
const INTERRUPTED_EXIT: i32 = 130;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config / --init-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        let path = effective_config_path().context("could not determine a config path")?;
        create_template_config(&path)?;
        out::print_success(&format!("A template dupe_sweep config was written to: {}", path.display()));
        out::print_info("Edit `reference_dir` and `target_dir` (and optionally `holding_dir`), then re-run.");
        return Ok(());
    }

    // Config file first, CLI wins.
    let mut cfg = load_config()?;
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            out::print_warn("Interrupted; files already relocated stay where they are.");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
            process::exit(INTERRUPTED_EXIT);
        })
        .context("install interrupt handler")?;
    }

    debug!(?args, "Starting dupe_sweep");

    let result = (|| -> Result<()> {
        validate_and_normalize(&mut cfg)?;
        let finder = cfg.engine_command();
        match pipeline::run(&cfg, &finder) {
            Ok(summary) => {
                summary.emit();
                Ok(())
            }
            Err(e) => {
                log_sweep_error(&e);
                Err(e.into())
            }
        }
    })();

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn print_config_location() {
    if let Some(p) = explicit_config_path() {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}\n", p.display()));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match effective_config_path() {
        Some(p) => {
            out::print_info(&format!("Default dupe_sweep config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn log_sweep_error(e: &SweepError) {
    let code = e.code();
    let kind = e.kind();
    match e {
        SweepError::IntraTargetDuplicates { dir, groups, files } => {
            error!(code, kind, dir = %dir.display(), groups, files, "Target holds duplicates of its own")
        }
        SweepError::EngineLaunch { program, source } => {
            error!(code, kind, program = %program, error = %source, "Duplicate finder could not be started")
        }
        SweepError::ReportUnreadable { path, source } => {
            error!(code, kind, path = %path.display(), error = %source, "Duplicate report unreadable")
        }
        SweepError::ReportMalformed { path, source } => {
            error!(code, kind, path = %path.display(), error = %source, "Duplicate report malformed")
        }
        _ => error!(code, kind, error = %e, "Sweep failed"),
    }
}
