//! Target-side selection.
//!
//! Walks every group of a duplicate report in report order and keeps the members that
//! live under the target directory. Membership is the only thing decided here: a group
//! with several target-side members contributes all of them.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::detect::{DuplicateReport, FileRecord};
use crate::normalize::NormalizedDir;

/// Flat, ordered list of target-side files scheduled for relocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetFileSet {
    files: Vec<FileRecord>,
}

impl TargetFileSet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.files.into_iter().map(|f| f.path).collect()
    }
}

impl From<Vec<FileRecord>> for TargetFileSet {
    fn from(files: Vec<FileRecord>) -> Self {
        Self { files }
    }
}

impl IntoIterator for TargetFileSet {
    type Item = FileRecord;
    type IntoIter = std::vec::IntoIter<FileRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Partition each group by containment in `target` and collect the target side.
pub fn select_target_files(report: DuplicateReport, target: &NormalizedDir) -> TargetFileSet {
    let mut files = Vec::new();
    for (idx, group) in report.into_groups().enumerate() {
        let total = group.members.len();
        let before = files.len();
        files.extend(group.members.into_iter().filter(|m| target.contains(&m.path)));
        let picked = files.len() - before;

        if picked > 0 && picked == total {
            warn!(
                group = idx + 1,
                files = picked,
                "Every copy in this group is inside the target; none remains outside it after relocation"
            );
        } else if picked > 1 {
            debug!(group = idx + 1, files = picked, "Group has several target-side copies");
        }
    }
    debug!(target = target.as_str(), selected = files.len(), "Target-side files selected");
    TargetFileSet { files }
}
