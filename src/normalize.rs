//! Directory path normalization for containment checks.
//!
//! Two forms are kept for every directory:
//! - `as_str()`: the path as given, with exactly one trailing separator. Used for display
//!   and for filesystem calls, so the original letter case is never altered.
//! - `key()`: a comparison key in Unicode NFC with `\` and `/` unified to `/`, repeated
//!   separators collapsed, letters lowercased and a single trailing `/`.
//!
//! Containment is a prefix test on keys, which makes it insensitive to case, to composed
//! versus decomposed accents (HFS+/APFS listings are NFD) and to the separator style the
//! duplicate finder happens to print.

use std::path::{MAIN_SEPARATOR, Path};
use unicode_normalization::UnicodeNormalization;

use crate::errors::SweepError;

/// A directory path in canonical form. Both fields are idempotent under `normalize_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDir {
    display: String,
    key: String,
}

impl NormalizedDir {
    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True if `path` lies under this directory (or is the directory itself).
    pub fn contains(&self, path: &Path) -> bool {
        let key = comparison_key(&path.to_string_lossy());
        key.starts_with(&self.key)
    }

    /// True if either directory contains the other.
    pub fn overlaps(&self, other: &NormalizedDir) -> bool {
        self.key.starts_with(&other.key) || other.key.starts_with(&self.key)
    }
}

fn is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Normalize a directory path. Fails only on an empty (or whitespace-only) string.
pub fn normalize_dir(raw: &str) -> Result<NormalizedDir, SweepError> {
    if raw.trim().is_empty() {
        return Err(SweepError::EmptyPath);
    }
    let trimmed = raw.trim_end_matches(is_sep);
    let mut display = String::with_capacity(trimmed.len() + 1);
    display.push_str(trimmed);
    display.push(trailing_separator(raw));
    Ok(NormalizedDir {
        key: comparison_key(&display),
        display,
    })
}

/// Normalize a directory given as a `Path`.
pub fn normalize_path(dir: &Path) -> Result<NormalizedDir, SweepError> {
    normalize_dir(&dir.to_string_lossy())
}

/// Keep whichever separator style the input already uses.
fn trailing_separator(raw: &str) -> char {
    if raw.contains('\\') && !raw.contains('/') {
        '\\'
    } else if raw.contains('/') {
        '/'
    } else {
        MAIN_SEPARATOR
    }
}

/// Comparison key for any path string (file or directory).
///
/// Directories gain a trailing `/`; callers comparing file paths only use the key as
/// the haystack of a prefix test, where the extra trailing slash is harmless.
pub fn comparison_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len() + 1);
    let mut last_sep = false;
    for c in raw.nfc() {
        if is_sep(c) {
            if !last_sep {
                key.push('/');
            }
            last_sep = true;
        } else {
            key.extend(c.to_lowercase());
            last_sep = false;
        }
    }
    if !last_sep {
        key.push('/');
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn adds_single_trailing_separator() {
        let n = normalize_dir("/data/Target").unwrap();
        assert_eq!(n.as_str(), "/data/Target/");
        assert_eq!(n.key(), "/data/target/");

        let n = normalize_dir("/data/Target///").unwrap();
        assert_eq!(n.as_str(), "/data/Target/");
    }

    #[test]
    fn windows_style_paths() {
        let n = normalize_dir(r"D:\Photos\Inbox\").unwrap();
        assert_eq!(n.as_str(), r"D:\Photos\Inbox\");
        assert_eq!(n.key(), "d:/photos/inbox/");
    }

    #[test]
    fn root_stays_root() {
        let n = normalize_dir("/").unwrap();
        assert_eq!(n.as_str(), "/");
        assert_eq!(n.key(), "/");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "/a/B/c",
            "/a/B/c/",
            r"C:\X\y",
            r"C:\X\y\\",
            "rel/dir",
            "/",
            "Mixed\\sep/path",
            "/data/Caf\u{e9}",
            "/data/Cafe\u{301}/",
        ] {
            let once = normalize_dir(raw).unwrap();
            let twice = normalize_dir(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
            assert_eq!(comparison_key(once.key()), once.key());
        }
    }

    #[test]
    fn empty_is_invalid() {
        assert!(matches!(normalize_dir(""), Err(SweepError::EmptyPath)));
        assert!(matches!(normalize_dir("   "), Err(SweepError::EmptyPath)));
    }

    #[test]
    fn containment_ignores_case_and_separators() {
        let t = normalize_dir("/Data/Target").unwrap();
        assert!(t.contains(&PathBuf::from("/data/target/a.txt")));
        assert!(t.contains(&PathBuf::from("/DATA/TARGET/sub/b.txt")));
        assert!(t.contains(&PathBuf::from(r"\data\target\c.txt")));
        assert!(t.contains(&PathBuf::from("/data//target/d.txt")));
        assert!(t.contains(&PathBuf::from("/data/target")));
        assert!(t.contains(&PathBuf::from("/data/target/")));
    }

    #[test]
    fn containment_ignores_unicode_composition() {
        let composed = normalize_dir("/data/Caf\u{e9}").unwrap();
        assert!(composed.contains(&PathBuf::from("/data/Cafe\u{301}/a.txt")));
        assert!(composed.contains(&PathBuf::from("/DATA/CAF\u{c9}/b.txt")));

        let decomposed = normalize_dir("/data/Cafe\u{301}").unwrap();
        assert!(decomposed.contains(&PathBuf::from("/data/caf\u{e9}/a.txt")));
        assert_eq!(composed.key(), decomposed.key());
        assert!(composed.overlaps(&decomposed));
    }

    #[test]
    fn sibling_with_common_prefix_is_not_contained() {
        let t = normalize_dir("/data/target").unwrap();
        assert!(!t.contains(&PathBuf::from("/data/target-old/a.txt")));
        assert!(!t.contains(&PathBuf::from("/data/reference/a.txt")));
    }

    #[test]
    fn overlap_detects_nesting_either_way() {
        let a = normalize_dir("/data/ref").unwrap();
        let b = normalize_dir("/DATA/ref/inner").unwrap();
        let c = normalize_dir("/data/other").unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }
}
