//! Duplicate report model and ingestion.
//!
//! The finder writes a JSON object keyed by file size; each value is a list of groups and
//! each group a list of file records:
//!
//! ```json
//! { "1024": [ [ {"path": "/ref/a.txt", "size": 1024, "hash": "..."},
//!               {"path": "/work/a.txt", "size": 1024, "hash": "..."} ] ] }
//! ```
//!
//! Ingestion is strict about what it keeps and lenient about what it drops: shape
//! problems are isolated to the smallest unit (member, group, bucket) and logged, and
//! only bytes that are not JSON at all abort the run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::SweepError;

/// One file as reported by the finder. Unknown fields are carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            extra: Map::new(),
        }
    }
}

/// Files the finder asserts have identical content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuplicateGroup {
    pub members: Vec<FileRecord>,
}

/// All groups reported for one file size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeBucket {
    pub size: u64,
    pub groups: Vec<DuplicateGroup>,
}

/// Parsed report in the finder's own traversal order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuplicateReport {
    pub buckets: Vec<SizeBucket>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.groups.is_empty())
    }

    pub fn group_count(&self) -> usize {
        self.buckets.iter().map(|b| b.groups.len()).sum()
    }

    pub fn file_count(&self) -> usize {
        self.groups().map(|g| g.members.len()).sum()
    }

    /// Groups in size/group traversal order.
    pub fn groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.buckets.iter().flat_map(|b| b.groups.iter())
    }

    pub fn into_groups(self) -> impl Iterator<Item = DuplicateGroup> {
        self.buckets.into_iter().flat_map(|b| b.groups.into_iter())
    }
}

/// Parse report bytes. `origin` is only used in messages.
pub fn ingest(bytes: &[u8], origin: &Path) -> Result<DuplicateReport, SweepError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        warn!(report = %origin.display(), "Duplicate report is empty; treating as no duplicates");
        return Ok(DuplicateReport::default());
    }

    let root: Value = serde_json::from_slice(bytes).map_err(|source| SweepError::ReportMalformed {
        path: origin.to_path_buf(),
        source,
    })?;

    let buckets = match root {
        Value::Null => {
            debug!(report = %origin.display(), "Duplicate report is null");
            return Ok(DuplicateReport::default());
        }
        Value::Object(map) => map,
        other => {
            warn!(
                report = %origin.display(),
                found = json_kind(&other),
                "Duplicate report is not a size-keyed object; treating as no duplicates (finder version mismatch?)"
            );
            return Ok(DuplicateReport::default());
        }
    };

    let mut report = DuplicateReport::default();
    for (key, value) in buckets {
        if let Some(bucket) = ingest_bucket(&key, value) {
            report.buckets.push(bucket);
        }
    }

    debug!(
        report = %origin.display(),
        buckets = report.buckets.len(),
        groups = report.group_count(),
        files = report.file_count(),
        "Duplicate report ingested"
    );
    Ok(report)
}

fn ingest_bucket(key: &str, value: Value) -> Option<SizeBucket> {
    let raw_groups = match value {
        Value::Array(groups) => groups,
        Value::Null => return None,
        other => {
            warn!(size_key = key, found = json_kind(&other), "Skipping size bucket that is not a list of groups");
            return None;
        }
    };

    let mut groups = Vec::with_capacity(raw_groups.len());
    for (idx, raw) in raw_groups.into_iter().enumerate() {
        if let Some(group) = ingest_group(key, idx, raw) {
            groups.push(group);
        }
    }
    if groups.is_empty() {
        return None;
    }

    let size = match key.trim().parse::<u64>() {
        Ok(size) => size,
        Err(_) => {
            let fallback = groups[0].members[0].size;
            warn!(size_key = key, fallback, "Size key is not an integer; using the first member's size");
            fallback
        }
    };
    Some(SizeBucket { size, groups })
}

fn ingest_group(key: &str, idx: usize, raw: Value) -> Option<DuplicateGroup> {
    let members = match raw {
        Value::Array(members) => members,
        other => {
            warn!(size_key = key, group = idx, found = json_kind(&other), "Skipping group that is not a list of files");
            return None;
        }
    };

    let mut records = Vec::with_capacity(members.len());
    for (pos, member) in members.into_iter().enumerate() {
        match serde_json::from_value::<FileRecord>(member) {
            Ok(rec) => records.push(rec),
            Err(e) if pos == 0 => {
                warn!(size_key = key, group = idx, error = %e, "Skipping group whose first member is not a file record");
                return None;
            }
            Err(e) => {
                warn!(size_key = key, group = idx, member = pos, error = %e, "Skipping member that is not a file record");
            }
        }
    }

    if records.is_empty() {
        None
    } else {
        Some(DuplicateGroup { members: records })
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> DuplicateReport {
        ingest(v.to_string().as_bytes(), Path::new("test.json")).unwrap()
    }

    #[test]
    fn parses_nested_shape_in_order() {
        let r = parse(json!({
            "300": [[{"path": "/r/c", "size": 300}, {"path": "/t/c", "size": 300}]],
            "10": [
                [{"path": "/r/a", "size": 10}, {"path": "/t/a", "size": 10}],
                [{"path": "/r/b", "size": 10}, {"path": "/t/b", "size": 10}]
            ]
        }));
        assert_eq!(r.buckets.len(), 2);
        assert_eq!(r.buckets[0].size, 300);
        assert_eq!(r.buckets[1].size, 10);
        assert_eq!(r.group_count(), 3);
        assert_eq!(r.file_count(), 6);
        let first: Vec<_> = r.groups().map(|g| g.members[0].path.clone()).collect();
        assert_eq!(first, vec![PathBuf::from("/r/c"), PathBuf::from("/r/a"), PathBuf::from("/r/b")]);
    }

    #[test]
    fn extra_fields_pass_through() {
        let r = parse(json!({
            "5": [[{"path": "/r/x", "size": 5, "hash": "abc", "modified_date": 17}]]
        }));
        let rec = &r.buckets[0].groups[0].members[0];
        assert_eq!(rec.extra.get("hash"), Some(&json!("abc")));
        assert_eq!(rec.extra.get("modified_date"), Some(&json!(17)));
    }

    #[test]
    fn empty_null_and_foreign_shapes_mean_no_duplicates() {
        assert!(ingest(b"", Path::new("x")).unwrap().is_empty());
        assert!(ingest(b"  \n", Path::new("x")).unwrap().is_empty());
        assert!(ingest(b"null", Path::new("x")).unwrap().is_empty());
        assert!(ingest(b"[1,2,3]", Path::new("x")).unwrap().is_empty());
        assert!(ingest(b"{}", Path::new("x")).unwrap().is_empty());
    }

    #[test]
    fn unparseable_bytes_are_fatal() {
        let err = ingest(b"{not json", Path::new("dupes.json")).unwrap_err();
        assert!(matches!(err, SweepError::ReportMalformed { .. }));
        assert!(err.to_string().contains("dupes.json"));
    }

    #[test]
    fn bad_group_is_skipped_not_fatal() {
        let r = parse(json!({
            "10": [
                [{"name": "no path here"}, {"path": "/t/a", "size": 10}],
                [{"path": "/r/b", "size": 10}, {"path": "/t/b", "size": 10}]
            ]
        }));
        assert_eq!(r.group_count(), 1);
        assert_eq!(r.buckets[0].groups[0].members[1].path, PathBuf::from("/t/b"));
    }

    #[test]
    fn bad_later_member_is_dropped() {
        let r = parse(json!({
            "10": [[{"path": "/r/a", "size": 10}, {"path": 42}, {"path": "/t/a", "size": 10}]]
        }));
        assert_eq!(r.buckets[0].groups[0].members.len(), 2);
    }

    #[test]
    fn empty_groups_and_wrong_bucket_types_are_ignored() {
        let r = parse(json!({
            "1": [[]],
            "2": "nonsense",
            "3": null,
            "4": [[{"path": "/r/d", "size": 4}, {"path": "/t/d", "size": 4}]]
        }));
        assert_eq!(r.buckets.len(), 1);
        assert_eq!(r.buckets[0].size, 4);
    }

    #[test]
    fn non_numeric_size_key_falls_back_to_member_size() {
        let r = parse(json!({
            "about 7": [[{"path": "/r/e", "size": 7}, {"path": "/t/e", "size": 7}]]
        }));
        assert_eq!(r.buckets[0].size, 7);
    }
}
