//! Collision-free names inside the holding directory.
//!
//! Files are placed flat in the holding directory under their own name. When that name
//! is taken, " (n)" is inserted before the extension, counting up from 2:
//! - "movie.mkv" -> "movie (2).mkv", "movie (3).mkv", ...
//! - ".env" -> ".env (2)"
//! - "archive.tar.gz" -> "archive.tar (2).gz"
//!
//! The stem is trimmed when needed so the final name stays within the filename limit.
//! The choice depends only on what already exists, so the same state yields the same name.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::trace;

#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240;
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255;

const MAX_SUFFIX: u64 = 100_000;

/// First free path for `name` inside `dir`, or `None` if every candidate is taken.
pub fn unique_destination(dir: &Path, name: &OsStr) -> Option<PathBuf> {
    let as_path = Path::new(name);
    let stem = as_path.file_stem().unwrap_or(name);
    let ext = as_path.extension();

    let first = dir.join(fit_name(stem, ext, ""));
    if !first.exists() {
        return Some(first);
    }

    for n in 2..=MAX_SUFFIX {
        let candidate = dir.join(fit_name(stem, ext, &format!(" ({n})")));
        if !candidate.exists() {
            if n > 2 {
                trace!(name = ?name, dir = %dir.display(), n, "holding directory: skipped taken suffixes");
            }
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(not(unix))]
fn units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// `stem + suffix + [.ext]`, trimming the stem to fit MAX_FILENAME_LEN.
fn fit_name(stem: &OsStr, ext: Option<&OsStr>, suffix: &str) -> OsString {
    let overhead = suffix.len() + ext.map(|e| 1 + units(e)).unwrap_or(0);
    let budget = MAX_FILENAME_LEN.saturating_sub(overhead).max(1);

    let mut out = if units(stem) <= budget {
        stem.to_os_string()
    } else {
        truncate(stem, budget)
    };
    out.push(suffix);
    if let Some(e) = ext {
        out.push(".");
        out.push(e);
    }
    out
}

fn truncate(stem: &OsStr, budget: usize) -> OsString {
    if let Some(s) = stem.to_str() {
        let mut end = 0;
        for (i, ch) in s.char_indices() {
            if i + ch.len_utf8() > budget {
                break;
            }
            end = i + ch.len_utf8();
        }
        return OsString::from(if end == 0 { "f" } else { &s[..end] });
    }
    #[cfg(unix)]
    {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};
        OsString::from_vec(stem.as_bytes()[..budget].to_vec())
    }
    #[cfg(not(unix))]
    {
        let lossy = stem.to_string_lossy();
        truncate(OsStr::new(lossy.as_ref()), budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn free_name_is_used_as_is() {
        let td = tempdir().unwrap();
        let d = unique_destination(td.path(), OsStr::new("file.txt")).unwrap();
        assert_eq!(d, td.path().join("file.txt"));
    }

    #[test]
    fn collisions_count_up_from_two() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("file.txt"), b"1").unwrap();
        assert_eq!(
            unique_destination(td.path(), OsStr::new("file.txt")).unwrap(),
            td.path().join("file (2).txt")
        );
        fs::write(td.path().join("file (2).txt"), b"2").unwrap();
        fs::write(td.path().join("file (3).txt"), b"3").unwrap();
        assert_eq!(
            unique_destination(td.path(), OsStr::new("file.txt")).unwrap(),
            td.path().join("file (4).txt")
        );
    }

    #[test]
    fn dotfile_and_multi_extension() {
        let td = tempdir().unwrap();
        fs::write(td.path().join(".env"), b"a").unwrap();
        fs::write(td.path().join("archive.tar.gz"), b"a").unwrap();
        assert_eq!(
            unique_destination(td.path(), OsStr::new(".env")).unwrap(),
            td.path().join(".env (2)")
        );
        assert_eq!(
            unique_destination(td.path(), OsStr::new("archive.tar.gz")).unwrap(),
            td.path().join("archive.tar (2).gz")
        );
    }

    #[test]
    fn long_names_are_trimmed_and_keep_extension() {
        let td = tempdir().unwrap();
        let long = format!("{}.txt", "b".repeat(400));
        let first = unique_destination(td.path(), OsStr::new(&long)).unwrap();
        let f1 = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(f1.len() <= 255 && f1.ends_with(".txt"));

        fs::write(&first, b"x").unwrap();
        let second = unique_destination(td.path(), OsStr::new(&long)).unwrap();
        let f2 = second.file_name().unwrap().to_string_lossy().into_owned();
        assert!(f2.len() <= 255, "got {}", f2.len());
        assert!(f2.ends_with(" (2).txt"), "got {f2}");
    }

    #[test]
    fn multibyte_stems_truncate_on_char_boundary() {
        let stem = "é".repeat(200);
        let out = fit_name(OsStr::new(&stem), Some(OsStr::new("jpg")), " (2)");
        let s = out.to_str().unwrap();
        assert!(s.len() <= MAX_FILENAME_LEN);
        assert!(s.ends_with(" (2).jpg"));
    }
}
