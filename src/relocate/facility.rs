//! Relocation facilities.
//!
//! A `Facility` wraps the strategy used to take one file out of the target directory:
//! - `Trash`: the platform's recoverable-deletion store (via the `trash` crate).
//! - `HoldingDir`: a rename into a configured directory.
//! - `Permanent`: plain deletion, used only when the trash cannot be enabled.
//!
//! A facility is acquired once per run and released when dropped. Acquisition probes the
//! trash once; if it is unavailable the user is warned a single time and the facility
//! deletes permanently for the rest of the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::RelocateError;
use crate::output as out;
use crate::platform::temp::tmp_sibling_in;

use super::duplicate::unique_destination;
use super::helpers::is_cross_device;

/// Where relocated files should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Trash,
    HoldingDir(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocatorKind {
    Trash,
    HoldingDir,
    Permanent,
}

/// Result of relocating one file successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocated {
    /// Moved to the trash or holding directory; `dest` is known for the holding directory.
    Moved { dest: Option<PathBuf> },
    /// Deleted permanently because the trash was unavailable.
    DeletedPermanently,
}

/// One strategy for taking a file out of the target directory.
pub trait Relocator {
    fn kind(&self) -> RelocatorKind;
    fn relocate(&mut self, path: &Path) -> Result<Relocated, RelocateError>;
}

/// Moves files into the platform trash.
#[derive(Debug, Default)]
pub struct TrashRelocator;

impl Relocator for TrashRelocator {
    fn kind(&self) -> RelocatorKind {
        RelocatorKind::Trash
    }

    fn relocate(&mut self, path: &Path) -> Result<Relocated, RelocateError> {
        // The trash layer reports a missing file poorly; check first for a clear error.
        fs::symlink_metadata(path).map_err(|e| RelocateError::from_io("stat", path, e))?;
        move_to_trash(path)?;
        Ok(Relocated::Moved { dest: None })
    }
}

#[cfg(feature = "trash")]
fn move_to_trash(path: &Path) -> Result<(), RelocateError> {
    trash::delete(path).map_err(|e| RelocateError::Trash {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(not(feature = "trash"))]
fn move_to_trash(path: &Path) -> Result<(), RelocateError> {
    Err(RelocateError::Trash {
        path: path.to_path_buf(),
        message: "built without trash support".into(),
    })
}

/// Renames files into a holding directory, resolving name collisions with " (n)".
#[derive(Debug)]
pub struct HoldingDirRelocator {
    dir: PathBuf,
}

impl HoldingDirRelocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Relocator for HoldingDirRelocator {
    fn kind(&self) -> RelocatorKind {
        RelocatorKind::HoldingDir
    }

    fn relocate(&mut self, path: &Path) -> Result<Relocated, RelocateError> {
        fs::symlink_metadata(path).map_err(|e| RelocateError::from_io("stat", path, e))?;
        let name = path.file_name().ok_or_else(|| RelocateError::Io {
            path: path.to_path_buf(),
            message: format!("'{}' has no file name", path.display()),
        })?;
        let dest = unique_destination(&self.dir, name).ok_or_else(|| RelocateError::Io {
            path: path.to_path_buf(),
            message: format!("no free name left for '{}' in {}", name.to_string_lossy(), self.dir.display()),
        })?;

        match fs::rename(path, &dest) {
            Ok(()) => {}
            Err(e) if is_cross_device(&e) => {
                debug!(src = %path.display(), dest = %dest.display(), "Cross-device rename; copying instead");
                copy_then_remove(path, &dest)?;
            }
            Err(e) => return Err(RelocateError::from_io("move into holding directory", path, e)),
        }
        Ok(Relocated::Moved { dest: Some(dest) })
    }
}

/// Copy `src` to a hidden temp sibling of `dest`, fsync, rename into place, remove `src`.
/// If `src` cannot be removed the copy is removed again so nothing is duplicated.
fn copy_then_remove(src: &Path, dest: &Path) -> Result<(), RelocateError> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tmp_sibling_in(dir, "relocate");

    let copy = || -> io::Result<()> {
        fs::copy(src, &tmp)?;
        fs::OpenOptions::new().write(true).open(&tmp)?.sync_all()?;
        fs::rename(&tmp, dest)
    };
    if let Err(e) = copy() {
        let _ = fs::remove_file(&tmp);
        return Err(RelocateError::from_io("copy into holding directory", src, e));
    }

    if let Err(e) = fs::remove_file(src) {
        let _ = fs::remove_file(dest);
        return Err(RelocateError::from_io("remove original after copy", src, e));
    }
    Ok(())
}

/// Deletes files outright. Only used as the trash fallback.
#[derive(Debug, Default)]
pub struct PermanentRelocator;

impl Relocator for PermanentRelocator {
    fn kind(&self) -> RelocatorKind {
        RelocatorKind::Permanent
    }

    fn relocate(&mut self, path: &Path) -> Result<Relocated, RelocateError> {
        fs::remove_file(path).map_err(|e| RelocateError::from_io("delete", path, e))?;
        Ok(Relocated::DeletedPermanently)
    }
}

/// Scoped handle on the relocation strategy for one run.
pub struct Facility {
    relocator: Box<dyn Relocator>,
    fallback: bool,
    used: usize,
}

impl Facility {
    /// Acquire the facility for `dest`, probing the platform trash when needed.
    pub fn acquire(dest: &Destination) -> Facility {
        Self::acquire_with(dest, probe_trash)
    }

    /// Like `acquire`, with an explicit trash probe.
    pub fn acquire_with<P>(dest: &Destination, probe: P) -> Facility
    where
        P: FnOnce() -> Result<(), String>,
    {
        match dest {
            Destination::HoldingDir(dir) => {
                debug!(dir = %dir.display(), "Relocation facility: holding directory");
                Self::from_relocator(Box::new(HoldingDirRelocator::new(dir.clone())))
            }
            Destination::Trash => match probe() {
                Ok(()) => {
                    debug!("Relocation facility: trash");
                    Self::from_relocator(Box::new(TrashRelocator))
                }
                Err(reason) => {
                    warn!(%reason, "Trash is unavailable; falling back to permanent deletion for this run");
                    out::print_warn(&format!(
                        "Trash is unavailable ({reason}); duplicates will be deleted permanently for this run."
                    ));
                    Self::from_relocator(Box::new(PermanentRelocator))
                }
            },
        }
    }

    /// Wrap an arbitrary relocator.
    pub fn from_relocator(relocator: Box<dyn Relocator>) -> Facility {
        let fallback = relocator.kind() == RelocatorKind::Permanent;
        Facility {
            relocator,
            fallback,
            used: 0,
        }
    }

    pub fn kind(&self) -> RelocatorKind {
        self.relocator.kind()
    }

    /// True when permanent deletion stands in for the trash.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn relocate(&mut self, path: &Path) -> Result<Relocated, RelocateError> {
        self.used += 1;
        self.relocator.relocate(path)
    }
}

impl Drop for Facility {
    fn drop(&mut self) {
        debug!(kind = ?self.relocator.kind(), calls = self.used, "Relocation facility released");
    }
}

/// Check once that the platform trash can be used.
#[cfg(feature = "trash")]
pub fn probe_trash() -> Result<(), String> {
    #[cfg(all(unix, not(target_os = "macos"), not(target_os = "ios"), not(target_os = "android")))]
    {
        let base = dirs::data_dir().ok_or_else(|| "no user data directory for the home trash".to_string())?;
        let home_trash = base.join("Trash");
        for sub in ["files", "info"] {
            let d = home_trash.join(sub);
            fs::create_dir_all(&d).map_err(|e| format!("cannot prepare {}: {e}", d.display()))?;
        }
        tracing::info!(trash = %home_trash.display(), "Home trash available");
    }
    Ok(())
}

#[cfg(not(feature = "trash"))]
pub fn probe_trash() -> Result<(), String> {
    Err("this build does not include trash support".into())
}
