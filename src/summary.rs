//! End-of-run accounting.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::output as out;
use crate::relocate::RelocationRun;

/// Final counts for one run plus the report location for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub dry_run: bool,
    /// Files selected for relocation.
    pub candidates: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// How many successes were permanent deletions standing in for the trash.
    pub deleted_via_fallback: usize,
    pub report_path: PathBuf,
    /// `(path, reason)` for each failed item, in processing order.
    pub failures: Vec<(PathBuf, String)>,
}

impl Summary {
    pub fn from_run(run: &RelocationRun, report_path: &Path) -> Summary {
        use crate::relocate::ItemOutcome;
        Summary {
            dry_run: run.dry_run,
            candidates: run.candidates.len(),
            attempted: run.attempted(),
            succeeded: run.succeeded(),
            failed: run.failed(),
            deleted_via_fallback: run
                .items
                .iter()
                .filter(|i| matches!(i.outcome, ItemOutcome::DeletedViaFallback))
                .count(),
            report_path: report_path.to_path_buf(),
            failures: run.failures().map(|(p, e)| (p.clone(), e.to_string())).collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        if self.dry_run {
            let _ = writeln!(s, "Dry run: {} file(s) would be relocated; nothing was changed.", self.candidates);
        }
        let _ = writeln!(
            s,
            "Attempted: {}  Succeeded: {}  Failed: {}",
            self.attempted, self.succeeded, self.failed
        );
        if self.deleted_via_fallback > 0 {
            let _ = writeln!(s, "Deleted permanently (trash unavailable): {}", self.deleted_via_fallback);
        }
        for (p, why) in &self.failures {
            let _ = writeln!(s, "  failed: {} ({why})", p.display());
        }
        let _ = write!(s, "Duplicate report: {}", self.report_path.display());
        s
    }

    /// Log the counts and print the rendered summary to stdout.
    pub fn emit(&self) {
        info!(
            dry_run = self.dry_run,
            candidates = self.candidates,
            attempted = self.attempted,
            succeeded = self.succeeded,
            failed = self.failed,
            report = %self.report_path.display(),
            "Run summary"
        );
        out::print_user(&self.render());
        if self.failed > 0 {
            out::print_warn(&format!("{} file(s) could not be relocated; see the list above.", self.failed));
        } else if !self.dry_run && self.attempted > 0 {
            out::print_success("All selected duplicates were relocated.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RelocateError;
    use crate::relocate::{ItemOutcome, ItemResult};

    fn item(p: &str, outcome: ItemOutcome) -> ItemResult {
        ItemResult { path: PathBuf::from(p), outcome }
    }

    #[test]
    fn counts_follow_outcomes() {
        let run = RelocationRun {
            dry_run: false,
            candidates: vec!["/t/a".into(), "/t/b".into(), "/t/c".into()],
            items: vec![
                item("/t/a", ItemOutcome::Moved { dest: None }),
                item("/t/b", ItemOutcome::Failed(RelocateError::NotFound("/t/b".into()))),
                item("/t/c", ItemOutcome::DeletedViaFallback),
            ],
            fallback: true,
        };
        let s = Summary::from_run(&run, Path::new("/r/duplicates.json"));
        assert_eq!((s.attempted, s.succeeded, s.failed), (3, 2, 1));
        assert_eq!(s.deleted_via_fallback, 1);
        let text = s.render();
        assert!(text.contains("Attempted: 3  Succeeded: 2  Failed: 1"), "{text}");
        assert!(text.contains("failed: /t/b"), "{text}");
        assert!(text.ends_with("Duplicate report: /r/duplicates.json"), "{text}");
    }

    #[test]
    fn dry_run_reports_candidates_and_zero_attempts() {
        let run = RelocationRun {
            dry_run: true,
            candidates: vec!["/t/a".into(), "/t/b".into()],
            ..RelocationRun::default()
        };
        let s = Summary::from_run(&run, Path::new("dups.json"));
        assert_eq!(s.candidates, 2);
        assert_eq!(s.attempted, 0);
        assert!(s.render().starts_with("Dry run: 2 file(s) would be relocated"));
    }
}
