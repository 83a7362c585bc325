//! Integration tests for the polling monitor.
//!
//! Each scenario mutates the watched directory from inside the handler once
//! the initial batch has been delivered, so the change lands before the
//! first sleep and is picked up by the very next scan. The handler cancels
//! the watch once it has seen the expected number of events.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use codex_directory_monitor::{
    CancellationToken, Change, ChangeHandler, ChangeKind, DirectoryMonitor, MonitorConfig,
    MonitorError,
};
use codex_directory_monitor::monitor::read_entries;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

type Action = Box<dyn FnOnce()>;

/// Records every change and runs a one-shot action after the initial batch.
struct Recorder {
    events: Vec<Change>,
    initial: usize,
    action: Option<Action>,
    stop_after: usize,
    token: CancellationToken,
}

impl Recorder {
    fn new(initial: usize, stop_after: usize, action: impl FnOnce() + 'static) -> Self {
        Self {
            events: Vec::new(),
            initial,
            action: Some(Box::new(action)),
            stop_after,
            token: CancellationToken::new(),
        }
    }

    fn record(&mut self, change: Change) {
        self.events.push(change);
        if self.events.len() == self.initial {
            if let Some(action) = self.action.take() {
                action();
            }
        }
        if self.events.len() >= self.stop_after {
            self.token.cancel();
        }
    }

    fn after_initial(&self) -> &[Change] {
        &self.events[self.initial..]
    }
}

impl ChangeHandler for Recorder {
    fn on_add(&mut self, name: &OsStr) {
        self.record(Change::added(name));
    }

    fn on_delete(&mut self, name: &OsStr) {
        self.record(Change::deleted(name));
    }
}

fn fast_monitor() -> DirectoryMonitor {
    DirectoryMonitor::with_config(
        MonitorConfig::new().with_poll_interval(Duration::from_millis(20)),
    )
    .unwrap()
}

fn populated_dir(names: &[&str]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for name in names {
        File::create(temp_dir.path().join(name)).unwrap();
    }
    temp_dir
}

fn touch(dir: &Path, name: &str) {
    File::create(dir.join(name)).unwrap();
}

fn run(monitor: &mut DirectoryMonitor, path: &Path, recorder: &mut Recorder) {
    let token = recorder.token.clone();
    monitor.watch_until(path, recorder, &token).unwrap();
}

#[test]
fn test_initial_batch_reports_every_entry() {
    let temp_dir = populated_dir(&["a", "b", "c", "d"]);
    fs::create_dir(temp_dir.path().join("subdir")).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let mut recorder = Recorder::new(5, usize::MAX, || {});

    fast_monitor()
        .watch_until(temp_dir.path(), &mut recorder, &token)
        .unwrap();

    assert_eq!(recorder.events.len(), 5);
    assert!(recorder.events.iter().all(|c| c.kind == ChangeKind::Added));

    // One addition per entry, in the order the directory listing returns them.
    let names: Vec<OsString> = recorder.events.iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, read_entries(temp_dir.path()).unwrap());

    let unique: HashSet<&OsStr> = names.iter().map(OsString::as_os_str).collect();
    let expected: HashSet<&OsStr> = ["a", "b", "c", "d", "subdir"]
        .into_iter()
        .map(OsStr::new)
        .collect();
    assert_eq!(unique, expected);
}

#[test]
fn test_detects_added_entry() {
    let temp_dir = populated_dir(&["a", "b"]);
    let dir = temp_dir.path().to_path_buf();

    let mut recorder = Recorder::new(2, 3, move || touch(&dir, "c"));
    run(&mut fast_monitor(), temp_dir.path(), &mut recorder);

    assert_eq!(recorder.after_initial(), &[Change::added("c")]);
}

#[test]
fn test_detects_deleted_entry() {
    let temp_dir = populated_dir(&["a", "b", "c"]);
    let victim = temp_dir.path().join("b");

    let mut recorder = Recorder::new(3, 4, move || fs::remove_file(victim).unwrap());
    run(&mut fast_monitor(), temp_dir.path(), &mut recorder);

    assert_eq!(recorder.after_initial(), &[Change::deleted("b")]);
}

#[test]
fn test_add_and_delete_in_same_interval() {
    let temp_dir = populated_dir(&["a"]);
    let dir = temp_dir.path().to_path_buf();

    let mut monitor = fast_monitor();
    let mut recorder = Recorder::new(1, 3, move || {
        touch(&dir, "b");
        fs::remove_file(dir.join("a")).unwrap();
    });
    run(&mut monitor, temp_dir.path(), &mut recorder);

    let changes: HashSet<_> = recorder.after_initial().iter().cloned().collect();
    assert_eq!(
        changes,
        HashSet::from([Change::added("b"), Change::deleted("a")])
    );
    assert_eq!(monitor.snapshot().unwrap().names(), vec!["b"]);
}

#[test]
fn test_churn_within_interval_is_invisible() {
    let temp_dir = populated_dir(&["keep"]);
    let dir = temp_dir.path().to_path_buf();

    let mut recorder = Recorder::new(1, 2, move || {
        touch(&dir, "scratch");
        fs::remove_file(dir.join("scratch")).unwrap();
        touch(&dir, "marker");
    });
    run(&mut fast_monitor(), temp_dir.path(), &mut recorder);

    assert_eq!(recorder.after_initial(), &[Change::added("marker")]);
}

#[test]
fn test_missing_directory_never_calls_handler() {
    let mut recorder = Recorder::new(usize::MAX, usize::MAX, || {});
    let token = recorder.token.clone();

    let err = fast_monitor()
        .watch_until("/nonexistent/path/12345", &mut recorder, &token)
        .unwrap_err();

    assert!(matches!(err, MonitorError::Io { .. }));
    assert!(recorder.events.is_empty());
}

#[test]
fn test_rescan_failure_ends_watch() {
    let temp_dir = TempDir::new().unwrap();
    let watched: PathBuf = temp_dir.path().join("watched");
    fs::create_dir(&watched).unwrap();
    touch(&watched, "a");

    let doomed = watched.clone();
    let mut recorder = Recorder::new(1, usize::MAX, move || {
        fs::remove_dir_all(doomed).unwrap();
    });
    let token = recorder.token.clone();

    let err = fast_monitor()
        .watch_until(&watched, &mut recorder, &token)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(recorder.events, vec![Change::added("a")]);
}

#[test]
fn test_unchanged_directory_yields_empty_changesets() {
    let temp_dir = populated_dir(&["a", "b"]);
    let mut monitor = fast_monitor();

    assert_eq!(monitor.poll(temp_dir.path()).unwrap().len(), 2);
    assert!(monitor.poll(temp_dir.path()).unwrap().is_empty());
    assert!(monitor.poll(temp_dir.path()).unwrap().is_empty());
}

#[test]
fn test_poll_async_from_blocking_context() {
    let temp_dir = populated_dir(&["a"]);
    let mut monitor = fast_monitor();

    let initial = tokio_test::block_on(monitor.poll_async(temp_dir.path())).unwrap();
    assert_eq!(initial.into_vec(), vec![Change::added("a")]);
}

#[tokio::test]
async fn test_watch_async_detects_changes() {
    let temp_dir = populated_dir(&["a", "b"]);
    let dir = temp_dir.path().to_path_buf();

    let mut recorder = Recorder::new(2, 4, move || {
        touch(&dir, "c");
        fs::remove_file(dir.join("a")).unwrap();
    });
    let token = recorder.token.clone();

    fast_monitor()
        .watch_async(temp_dir.path(), &mut recorder, &token)
        .await
        .unwrap();

    let changes: HashSet<_> = recorder.after_initial().iter().cloned().collect();
    assert_eq!(
        changes,
        HashSet::from([Change::added("c"), Change::deleted("a")])
    );
}
