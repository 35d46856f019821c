use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use dupe_sweep::config::validate_and_normalize;
use dupe_sweep::pipeline::{run, run_with};
use dupe_sweep::relocate::Facility;
use dupe_sweep::{Config, DuplicateFinder, SweepError};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

/// Finder double: answers the target-only search and the cross-folder search from a script.
struct Scripted {
    target_only: Option<Value>,
    cross: Option<Value>,
    calls: RefCell<Vec<Vec<PathBuf>>>,
}

impl Scripted {
    fn new(target_only: Option<Value>, cross: Option<Value>) -> Self {
        Self {
            target_only,
            cross,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl DuplicateFinder for Scripted {
    fn find(&self, dirs: &[&Path], report: &Path) -> Result<(), SweepError> {
        self.calls
            .borrow_mut()
            .push(dirs.iter().map(|d| d.to_path_buf()).collect());
        let body = if dirs.len() == 1 { &self.target_only } else { &self.cross };
        if let Some(v) = body {
            fs::write(report, serde_json::to_vec(v).unwrap()).unwrap();
        }
        Ok(())
    }
}

struct Tree {
    _td: TempDir,
    cfg: Config,
}

impl Tree {
    fn reference(&self, name: &str) -> PathBuf {
        self.cfg.reference_dir.join(name)
    }
    fn target(&self, name: &str) -> PathBuf {
        self.cfg.target_dir.join(name)
    }
}

/// reference/A.txt == target/A.txt; target/B.txt is unique.
fn clean_tree(holding: bool) -> Tree {
    let td = tempdir().unwrap();
    let r = td.path().join("reference");
    let t = td.path().join("target");
    fs::create_dir_all(&r).unwrap();
    fs::create_dir_all(&t).unwrap();
    fs::write(r.join("A.txt"), "X").unwrap();
    fs::write(t.join("A.txt"), "X").unwrap();
    fs::write(t.join("B.txt"), "Y").unwrap();

    let mut cfg = Config::new(&r, &t);
    cfg.report_file = td.path().join("duplicates.json");
    if holding {
        cfg.holding_dir = Some(td.path().join("holding"));
    }
    cfg.pause_ms = 0;
    validate_and_normalize(&mut cfg).unwrap();
    Tree { _td: td, cfg }
}

fn pair_report(a: &Path, b: &Path) -> Value {
    json!({ "1": [[{ "path": a, "size": 1 }, { "path": b, "size": 1 }]] })
}

#[test]
fn clean_run_relocates_only_the_target_copy() {
    let tree = clean_tree(true);
    let finder = Scripted::new(None, Some(pair_report(&tree.reference("A.txt"), &tree.target("A.txt"))));

    let summary = run(&tree.cfg, &finder).unwrap();

    assert_eq!((summary.attempted, summary.succeeded, summary.failed), (1, 1, 0));
    let hold = tree.cfg.holding_dir.clone().unwrap();
    assert_eq!(fs::read_to_string(hold.join("A.txt")).unwrap(), "X");
    assert!(!tree.target("A.txt").exists());
    assert!(tree.target("B.txt").exists());
    assert!(tree.reference("A.txt").exists());
    assert!(tree.cfg.report_file.exists(), "report is kept for audit");
    assert_eq!(summary.report_path, tree.cfg.report_file);

    let calls = finder.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec![tree.cfg.target_dir.clone()]);
    assert_eq!(calls[1], vec![tree.cfg.reference_dir.clone(), tree.cfg.target_dir.clone()]);
}

#[test]
fn intra_target_duplicates_stop_before_cross_search() {
    let tree = clean_tree(true);
    fs::write(tree.target("A-copy.txt"), "X").unwrap();
    let finder = Scripted::new(
        Some(pair_report(&tree.target("A.txt"), &tree.target("A-copy.txt"))),
        Some(pair_report(&tree.reference("A.txt"), &tree.target("A.txt"))),
    );

    let err = run(&tree.cfg, &finder).unwrap_err();

    assert!(matches!(err, SweepError::IntraTargetDuplicates { groups: 1, files: 2, .. }), "{err}");
    assert_eq!(finder.calls.borrow().len(), 1, "cross-folder search must not run");
    assert!(tree.target("A.txt").exists());
    assert!(tree.target("A-copy.txt").exists());
}

#[test]
fn no_report_means_nothing_to_do() {
    let tree = clean_tree(false);
    let finder = Scripted::new(None, None);

    let summary = run_with(&tree.cfg, &finder, |_| panic!("facility must not be acquired")).unwrap();

    assert_eq!((summary.attempted, summary.succeeded, summary.failed), (0, 0, 0));
    assert!(tree.target("A.txt").exists());
}

#[test]
fn stale_report_from_an_earlier_run_is_not_reused() {
    let tree = clean_tree(false);
    fs::write(
        &tree.cfg.report_file,
        serde_json::to_vec(&pair_report(&tree.reference("A.txt"), &tree.target("A.txt"))).unwrap(),
    )
    .unwrap();
    let finder = Scripted::new(None, None);

    let summary = run_with(&tree.cfg, &finder, |_| panic!("facility must not be acquired")).unwrap();

    assert_eq!(summary.attempted, 0);
    assert!(!tree.cfg.report_file.exists());
}

#[test]
fn unavailable_trash_falls_back_to_permanent_deletion() {
    let tree = clean_tree(false);
    let finder = Scripted::new(None, Some(pair_report(&tree.reference("A.txt"), &tree.target("A.txt"))));

    let summary = run_with(&tree.cfg, &finder, |dest| {
        Facility::acquire_with(dest, || Err("no trash on this system".into()))
    })
    .unwrap();

    assert_eq!((summary.attempted, summary.succeeded, summary.failed), (1, 1, 0));
    assert_eq!(summary.deleted_via_fallback, 1);
    assert!(!tree.target("A.txt").exists());
    assert!(tree.reference("A.txt").exists());
}

#[test]
fn vanished_file_is_counted_and_the_rest_continue() {
    let tree = clean_tree(true);
    let report = json!({
        "1": [
            [{ "path": tree.reference("A.txt"), "size": 1 }, { "path": tree.target("gone.txt"), "size": 1 }],
            [{ "path": tree.reference("A.txt"), "size": 1 }, { "path": tree.target("A.txt"), "size": 1 }]
        ]
    });
    let finder = Scripted::new(None, Some(report));

    let summary = run(&tree.cfg, &finder).unwrap();

    assert_eq!((summary.attempted, summary.succeeded, summary.failed), (2, 1, 1));
    assert_eq!(summary.failures[0].0, tree.target("gone.txt"));
    assert!(!tree.target("A.txt").exists());
}

#[test]
fn dry_run_lists_candidates_and_touches_nothing() {
    let mut tree = clean_tree(true);
    tree.cfg.dry_run = true;
    let finder = Scripted::new(None, Some(pair_report(&tree.reference("A.txt"), &tree.target("A.txt"))));

    let summary = run_with(&tree.cfg, &finder, |_| panic!("dry run must not acquire a facility")).unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.attempted, 0);
    assert!(tree.target("A.txt").exists());
    let hold = tree.cfg.holding_dir.clone().unwrap();
    assert_eq!(fs::read_dir(hold).unwrap().count(), 0);
}

#[test]
fn malformed_cross_report_is_fatal() {
    let tree = clean_tree(true);
    struct Garbage;
    impl DuplicateFinder for Garbage {
        fn find(&self, dirs: &[&Path], report: &Path) -> Result<(), SweepError> {
            if dirs.len() == 2 {
                fs::write(report, "{not json").unwrap();
            }
            Ok(())
        }
    }

    let err = run(&tree.cfg, &Garbage).unwrap_err();
    assert!(matches!(err, SweepError::ReportMalformed { .. }), "{err}");
    assert!(tree.target("A.txt").exists());
}
