//! Unique hidden sibling names for write-then-rename.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hidden temp name inside `dir`.
/// Pattern: .dupe_sweep.<tag>.tmp.<pid>.<nanos>.<seq>
pub(crate) fn tmp_sibling_in(dir: &Path, tag: &str) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(".dupe_sweep.{tag}.tmp.{pid}.{nanos}.{seq}"))
}

/// Hidden temp sibling of `target`, used for atomic config writes.
pub(crate) fn tmp_config_sibling_name(target: &Path) -> PathBuf {
    tmp_sibling_in(target.parent().unwrap_or_else(|| Path::new(".")), "config")
}
