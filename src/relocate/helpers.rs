//! I/O error enrichment.
//!
//! Turns a bare `io::Error` into a message naming the operation, the path and a
//! platform-aware hint, so a failed item in the summary is actionable on its own.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create holding directory", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Hint for a raw OS error code, if we know one.
#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions",
        libc::EXDEV => "cross-filesystem; rename not possible, a copy is required",
        libc::EBUSY | libc::ETXTBSY => "resource busy; close programs using the file",
        libc::ENOENT => "path not found; it may have been moved since the report was written",
        libc::EEXIST => "already exists",
        libc::ENOSPC => "insufficient space on device",
        libc::EROFS => "read-only filesystem",
        libc::ENAMETOOLONG => "filename or path too long",
        libc::EMFILE | libc::ENFILE => "too many open files",
        _ => return None,
    };
    Some(hint)
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        5 => "access denied; check permissions",
        17 => "not same device; rename not possible, a copy is required",
        32 | 33 => "sharing violation; file is in use",
        2 | 3 => "path not found; it may have been moved since the report was written",
        80 | 183 => "already exists",
        112 => "insufficient disk space",
        19 => "write protected media",
        206 => "filename or path too long",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        _ => None,
    }
}

/// "<op> '<path>': <error>; <hint> [os code: N]"
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    match e.raw_os_error() {
        Some(code) => {
            if let Some(h) = os_hint(code) {
                msg.push_str("; ");
                msg.push_str(h);
            }
            msg.push_str(&format!(" [os code: {code}]"));
        }
        None => {
            if let Some(h) = kind_hint(e.kind()) {
                msg.push_str("; ");
                msg.push_str(h);
            }
        }
    }
    msg
}

/// True when a rename failed only because source and destination are on different devices.
pub fn is_cross_device(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(libc::EXDEV)
    }
    #[cfg(windows)]
    {
        e.raw_os_error() == Some(17)
    }
    #[cfg(not(any(unix, windows)))]
    {
        e.kind() == io::ErrorKind::CrossesDevices
    }
}

/// Adapter for `anyhow::Result` code paths: `.map_err(io_error_with_help(op, path))`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(describe_io_error(op, path, &e))
}
