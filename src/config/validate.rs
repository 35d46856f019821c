//! Config validation.
//! Verifies directory existence and permissions, canonicalizes paths, and keeps the
//! reference, target and holding directories apart.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info};

use crate::errors::SweepError;
use crate::normalize::normalize_path;
use crate::relocate::helpers::io_error_with_help;

use super::types::Config;

fn invalid(msg: String) -> anyhow::Error {
    error!(code = 10, kind = "invalid_config", "{msg}");
    SweepError::InvalidConfig(msg).into()
}

/// Check `cfg` before any external process runs and rewrite its paths in canonical form.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    if cfg.reference_dir.as_os_str().is_empty() {
        return Err(invalid("reference_dir is not set; pass --reference or set <reference_dir>".into()));
    }
    if cfg.target_dir.as_os_str().is_empty() {
        return Err(invalid("target_dir is not set; pass --target or set <target_dir>".into()));
    }

    ensure_dir_exists_and_is_dir(&cfg.reference_dir, "reference_dir")?;
    ensure_readable(&cfg.reference_dir, "reference_dir")?;
    ensure_dir_exists_and_is_dir(&cfg.target_dir, "target_dir")?;
    ensure_readable(&cfg.target_dir, "target_dir")?;

    cfg.reference_dir = canonical(&cfg.reference_dir, "reference_dir")?;
    cfg.target_dir = canonical(&cfg.target_dir, "target_dir")?;
    ensure_disjoint(&cfg.reference_dir, "reference_dir", &cfg.target_dir, "target_dir")?;

    if let Some(hold) = cfg.holding_dir.clone() {
        // Checked before creation so a misplaced holding dir is never left behind.
        let hold = anchored(&hold, "holding_dir")?;
        let planned = prospective_path(&hold, "holding_dir")?;
        ensure_outside_sources(cfg, "holding_dir", &planned)?;
        ensure_dir_is_or_create(&hold, "holding_dir")?;
        ensure_writable(&hold, "holding_dir")?;
        let hold = canonical(&hold, "holding_dir")?;
        ensure_outside_sources(cfg, "holding_dir", &hold)?;
        cfg.holding_dir = Some(hold);
    }

    let report = anchored(&cfg.report_file, "report_file")?;
    let (parent, name) = match (report.parent(), report.file_name()) {
        (Some(parent), Some(name)) if parent.is_dir() => (parent, name),
        _ => {
            return Err(invalid(format!(
                "report_file '{}' must be a file name inside an existing directory",
                report.display()
            )));
        }
    };
    let report = canonical(parent, "report_file directory")?.join(name);
    // The report is deleted and rewritten on every search.
    ensure_outside_sources(cfg, "report_file", &report)?;
    if report.is_dir() {
        return Err(invalid(format!("report_file '{}' is a directory", report.display())));
    }
    cfg.report_file = report;

    info!(
        reference = %cfg.reference_dir.display(),
        target = %cfg.target_dir.display(),
        holding = %cfg.holding_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<trash>".into()),
        report = %cfg.report_file.display(),
        "Config validated"
    );
    Ok(())
}

fn canonical(path: &Path, name: &str) -> Result<PathBuf> {
    dunce::canonicalize(path).with_context(|| format!("Cannot resolve {name} '{}'", path.display()))
}

/// `a` and `b` must not be equal nor nested, physically or by case-folded key.
fn ensure_disjoint(a: &Path, a_name: &str, b: &Path, b_name: &str) -> Result<()> {
    if a == b {
        return Err(invalid(format!("{a_name} and {b_name} resolve to the same path: '{}'", a.display())));
    }
    if a.starts_with(b) {
        return Err(invalid(format!("{a_name} '{}' must not be inside {b_name} '{}'", a.display(), b.display())));
    }
    if b.starts_with(a) {
        return Err(invalid(format!("{b_name} '{}' must not be inside {a_name} '{}'", b.display(), a.display())));
    }
    let (ka, kb) = (normalize_path(a)?, normalize_path(b)?);
    if ka.overlaps(&kb) {
        return Err(invalid(format!(
            "{a_name} '{}' and {b_name} '{}' differ only by case or separators, or one contains the other when compared that way",
            a.display(),
            b.display()
        )));
    }
    Ok(())
}

/// Resolve a relative path against the working directory.
fn anchored(path: &Path, name: &str) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().with_context(|| format!("resolve working directory for {name}"))?;
    Ok(cwd.join(path))
}

/// Physical location `path` will have once created: the nearest existing ancestor
/// canonicalized, with the missing tail applied lexically.
fn prospective_path(path: &Path, name: &str) -> Result<PathBuf> {
    let Some(existing) = path.ancestors().find(|a| a.exists()) else {
        return Err(invalid(format!("{name} '{}' has no existing ancestor", path.display())));
    };
    let mut resolved = canonical(existing, name)?;
    let tail = path.strip_prefix(existing).unwrap_or(Path::new(""));
    for comp in tail.components() {
        match comp {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            _ => {}
        }
    }
    Ok(resolved)
}

/// `path` must lie outside both the reference and the target directory.
fn ensure_outside_sources(cfg: &Config, what: &str, path: &Path) -> Result<()> {
    ensure_not_inside(what, path, "target_dir", &cfg.target_dir)?;
    ensure_not_inside(what, path, "reference_dir", &cfg.reference_dir)
}

/// `inner` must not be `outer` or below it, physically or by comparison key.
fn ensure_not_inside(what: &str, inner: &Path, outer_name: &str, outer: &Path) -> Result<()> {
    let key_outer = normalize_path(outer)?;
    if inner.starts_with(outer) || key_outer.contains(inner) {
        return Err(invalid(format!(
            "{what} '{}' must not be {outer_name} or inside it ('{}')",
            inner.display(),
            outer.display()
        )));
    }
    Ok(())
}

fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        return Err(invalid(format!("{name} does not exist: {}", path.display())));
    }
    if !path.is_dir() {
        return Err(invalid(format!("{name} is not a directory: {}", path.display())));
    }
    Ok(())
}

fn ensure_readable(path: &Path, name: &str) -> Result<()> {
    fs::read_dir(path)
        .with_context(|| format!("Cannot read {name} directory '{}'; check permissions", path.display()))?;
    debug!("{name} readable: {}", path.display());
    Ok(())
}

fn ensure_dir_is_or_create(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(invalid(format!("{name} exists but isn't a directory: {}", path.display())));
        }
    } else {
        fs::create_dir_all(path).map_err(io_error_with_help("create directory", path))?;
        info!("Created {name} directory: {}", path.display());
    }
    Ok(())
}

/// Non-destructive probe: create and remove a hidden file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    let probe = path.join(format!(".dupe_sweep_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)
        .map_err(io_error_with_help("write probe file", &probe))
        .with_context(|| format!("Cannot write to {name} '{}'", path.display()))?;
    let _ = fs::remove_file(&probe);
    debug!("{name} writable: {}", path.display());
    Ok(())
}
