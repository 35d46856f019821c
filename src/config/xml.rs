//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde; unknown fields are rejected).
//! - Writes a commented template on request (`--init-config`).
//!
//! This module only reads/writes the config file; directory checks happen in `validate`.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, explicit_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_MS, DEFAULT_REPORT_FILE};

use crate::detect::{DEFAULT_ENGINE, HashType};
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    reference_dir: Option<String>,
    target_dir: Option<String>,
    holding_dir: Option<String>,
    report_file: Option<String>,
    engine: Option<String>,
    hash_type: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    batch_size: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    pause_ms: Option<u64>,
}

// Optional integer with surrounding whitespace allowed; garbage is an error.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("expected a whole number, got '{s}': {e}"))),
    }
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim).filter(|t| !t.is_empty()).map(PathBuf::from)
}

// Map XmlConfig -> Config on top of the defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(p) = non_empty_path(parsed.reference_dir.as_deref()) {
        cfg.reference_dir = p;
    }
    if let Some(p) = non_empty_path(parsed.target_dir.as_deref()) {
        cfg.target_dir = p;
    }
    cfg.holding_dir = non_empty_path(parsed.holding_dir.as_deref());
    if let Some(p) = non_empty_path(parsed.report_file.as_deref()) {
        cfg.report_file = p;
    }
    if let Some(p) = non_empty_path(parsed.engine.as_deref()) {
        cfg.engine = p;
    }
    cfg.log_file = non_empty_path(parsed.log_file.as_deref());

    if let Some(s) = parsed.hash_type.as_deref().filter(|s| !s.trim().is_empty()) {
        cfg.hash_type = s.parse::<HashType>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = parsed.log_level.as_deref().filter(|s| !s.trim().is_empty()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    if let Some(n) = parsed.batch_size {
        cfg.batch_size = usize::try_from(n).unwrap_or(usize::MAX).max(1);
    }
    if let Some(ms) = parsed.pause_ms {
        cfg.pause_ms = ms;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the effective config.
///
/// `DUPE_SWEEP_CONFIG` must name a readable file. Without it, the default location is
/// used when present; a missing default file means all defaults.
pub fn load_config() -> Result<Config> {
    if let Some(p) = explicit_config_path() {
        debug!(path = %p.display(), "Loading config named by environment");
        return load_config_from_xml_path(&p);
    }
    match default_config_path() {
        Some(p) if p.exists() => {
            debug!(path = %p.display(), "Loading config from default location");
            load_config_from_xml_path(&p)
        }
        _ => Ok(Config::default()),
    }
}

/// Write a commented template config at `path` (0600 on Unix, atomic).
/// Refuses when the file already exists or an existing ancestor is a symlink.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!("Refusing to create config: ancestor of {} is a symlink", path.display());
    }
    if fs::symlink_metadata(path).is_ok() {
        bail!("Refusing to overwrite existing config: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory '{}'", parent.display()))?;
            let _ = set_dir_mode_0700(parent);
        }
    }

    write_config_secure_new_0600(path, template_text().as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}

fn template_text() -> String {
    format!(
        "<!--\n  dupe_sweep configuration (XML)\n\n  reference_dir  -> directory whose files are kept\n  target_dir     -> directory whose duplicates of reference files are relocated\n  holding_dir    -> optional; move duplicates here instead of the trash\n  report_file    -> where the duplicate finder writes its JSON report (kept for audit)\n  engine         -> duplicate finder executable\n  hash_type      -> blake3 | crc32 | xxh3\n  log_level      -> quiet | normal | info | debug\n  log_file       -> optional path to a log file (stderr is still used)\n  batch_size     -> items per progress batch\n  pause_ms       -> pause between batches while using the trash\n\n  CLI flags override XML values.\n-->\n<config>\n  <reference_dir>/path/to/reference</reference_dir>\n  <target_dir>/path/to/target</target_dir>\n  <holding_dir></holding_dir>\n  <report_file>{DEFAULT_REPORT_FILE}</report_file>\n  <engine>{DEFAULT_ENGINE}</engine>\n  <hash_type>{}</hash_type>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <batch_size>{DEFAULT_BATCH_SIZE}</batch_size>\n  <pause_ms>{DEFAULT_PAUSE_MS}</pause_ms>\n</config>\n",
        HashType::default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn template_parses_back() {
        let td = tempdir().unwrap();
        let p = td.path().join("cfg").join("config.xml");
        create_template_config(&p).unwrap();
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert_eq!(cfg.reference_dir, PathBuf::from("/path/to/reference"));
        assert_eq!(cfg.holding_dir, None);
        assert_eq!(cfg.log_file, None);
        assert_eq!(cfg.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.hash_type, HashType::Blake3);
    }

    #[test]
    fn template_refuses_existing_file() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config/>").unwrap();
        assert!(create_template_config(&p).is_err());
        assert_eq!(fs::read_to_string(&p).unwrap(), "<config/>");
    }

    #[test]
    fn values_are_trimmed_and_mapped() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(
            &p,
            "<config>\n  <reference_dir> /r </reference_dir>\n  <target_dir>/t</target_dir>\n  <holding_dir>/h</holding_dir>\n  <hash_type>XXH3</hash_type>\n  <log_level>debug</log_level>\n  <batch_size> 0 </batch_size>\n  <pause_ms>5</pause_ms>\n</config>\n",
        )
        .unwrap();
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert_eq!(cfg.reference_dir, PathBuf::from("/r"));
        assert_eq!(cfg.holding_dir, Some(PathBuf::from("/h")));
        assert_eq!(cfg.hash_type, HashType::Xxh3);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.batch_size, 1);
        assert_eq!(cfg.pause_ms, 5);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config><download_base>/x</download_base></config>").unwrap();
        let err = load_config_from_xml_path(&p).unwrap_err();
        assert!(format!("{err:#}").contains("parse config xml"), "{err:#}");
    }

    #[test]
    fn bad_hash_type_is_rejected() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config><hash_type>md5</hash_type></config>").unwrap();
        let err = load_config_from_xml_path(&p).unwrap_err();
        assert!(format!("{err:#}").contains("invalid hash type"), "{err:#}");
    }
}
