//! Polling directory monitor.

use std::convert::Infallible;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::event::ChangeSet;
use crate::snapshot::Snapshot;

/// Receives changes detected by a [`DirectoryMonitor`].
///
/// Methods are called synchronously from the monitor's loop, so a slow
/// handler delays the next scan. Names are passed exactly as the filesystem
/// reports them and need not be valid UTF-8.
pub trait ChangeHandler {
    /// An entry appeared in the directory.
    fn on_add(&mut self, name: &OsStr);

    /// An entry disappeared from the directory.
    fn on_delete(&mut self, name: &OsStr);
}

impl<H: ChangeHandler + ?Sized> ChangeHandler for &mut H {
    fn on_add(&mut self, name: &OsStr) {
        (**self).on_add(name);
    }

    fn on_delete(&mut self, name: &OsStr) {
        (**self).on_delete(name);
    }
}

/// Adapts a pair of closures to [`ChangeHandler`].
pub struct Callbacks<A, D> {
    on_add: A,
    on_delete: D,
}

impl<A, D> Callbacks<A, D>
where
    A: FnMut(&OsStr),
    D: FnMut(&OsStr),
{
    /// Wrap an addition and a deletion callback.
    pub fn new(on_add: A, on_delete: D) -> Self {
        Self { on_add, on_delete }
    }
}

impl<A, D> ChangeHandler for Callbacks<A, D>
where
    A: FnMut(&OsStr),
    D: FnMut(&OsStr),
{
    fn on_add(&mut self, name: &OsStr) {
        (self.on_add)(name);
    }

    fn on_delete(&mut self, name: &OsStr) {
        (self.on_delete)(name);
    }
}

/// Watches a single directory by listing it at a fixed interval.
///
/// Only presence by name is tracked: a rename shows up as a deletion plus an
/// addition, and an entry recreated between two scans is not reported.
#[derive(Debug, Default)]
pub struct DirectoryMonitor {
    config: MonitorConfig,

    /// Built on the first listing.
    snapshot: Option<Snapshot>,
}

impl DirectoryMonitor {
    /// Create a monitor polling once per second.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a monitor with a custom configuration.
    pub fn with_config(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            snapshot: None,
        })
    }

    /// The configuration this monitor runs with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The current snapshot, if the directory has been listed at least once.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Run one scan and return what changed since the previous one.
    ///
    /// The first call builds the snapshot and reports every entry as added,
    /// unless the config skips the initial batch.
    pub fn poll(&mut self, path: impl AsRef<Path>) -> Result<ChangeSet> {
        let path = path.as_ref();
        let listing = read_entries(path).inspect_err(log_scan_failure)?;
        Ok(self.apply(listing))
    }

    /// Async counterpart of [`poll`](Self::poll).
    pub async fn poll_async(&mut self, path: impl AsRef<Path>) -> Result<ChangeSet> {
        let path = path.as_ref();
        let listing = read_entries_async(path)
            .await
            .inspect_err(log_scan_failure)?;
        Ok(self.apply(listing))
    }

    /// Watch `path`, calling `on_add` and `on_delete` for every change.
    ///
    /// Blocks the calling thread. Pre-existing entries are reported through
    /// `on_add` before the first sleep. Only returns when listing the
    /// directory fails.
    pub fn watch<A, D>(
        &mut self,
        path: impl AsRef<Path>,
        on_add: A,
        on_delete: D,
    ) -> Result<Infallible>
    where
        A: FnMut(&OsStr),
        D: FnMut(&OsStr),
    {
        self.watch_with(path, &mut Callbacks::new(on_add, on_delete))
    }

    /// Like [`watch`](Self::watch), dispatching to a [`ChangeHandler`].
    pub fn watch_with<H>(
        &mut self,
        path: impl AsRef<Path>,
        handler: &mut H,
    ) -> Result<Infallible>
    where
        H: ChangeHandler + ?Sized,
    {
        let path = path.as_ref();
        self.start(path, handler)?;

        loop {
            thread::sleep(self.config.poll_interval());
            let changes = self.poll(path)?;
            self.dispatch(&changes, handler);
        }
    }

    /// Like [`watch_with`](Self::watch_with), but returns `Ok(())` once
    /// `token` is cancelled.
    ///
    /// The token is checked before every sleep; a cancellation during a
    /// sleep takes effect when the next scan finishes.
    pub fn watch_until<H>(
        &mut self,
        path: impl AsRef<Path>,
        handler: &mut H,
        token: &CancellationToken,
    ) -> Result<()>
    where
        H: ChangeHandler + ?Sized,
    {
        let path = path.as_ref();
        self.start(path, handler)?;

        loop {
            if token.is_cancelled() {
                info!("Stopped watching: {}", path.display());
                return Ok(());
            }
            thread::sleep(self.config.poll_interval());
            let changes = self.poll(path)?;
            self.dispatch(&changes, handler);
        }
    }

    /// Watch `path` on the tokio runtime until `token` is cancelled.
    ///
    /// Handler calls still run inline on the watching task. Cancellation
    /// interrupts the sleep between scans.
    pub async fn watch_async<H>(
        &mut self,
        path: impl AsRef<Path>,
        handler: &mut H,
        token: &CancellationToken,
    ) -> Result<()>
    where
        H: ChangeHandler + ?Sized,
    {
        let path = path.as_ref();
        self.snapshot = None;
        let initial = self.poll_async(path).await?;
        self.log_start(path);
        self.dispatch(&initial, handler);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("Stopped watching: {}", path.display());
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
            }
            let changes = self.poll_async(path).await?;
            self.dispatch(&changes, handler);
        }
    }

    /// Discard any previous snapshot, list the directory and report the
    /// initial batch.
    fn start<H>(&mut self, path: &Path, handler: &mut H) -> Result<()>
    where
        H: ChangeHandler + ?Sized,
    {
        self.snapshot = None;
        let initial = self.poll(path)?;
        self.log_start(path);
        self.dispatch(&initial, handler);
        Ok(())
    }

    fn apply(&mut self, listing: Vec<OsString>) -> ChangeSet {
        match self.snapshot.as_mut() {
            Some(snapshot) => snapshot.diff(listing),
            None => {
                let mut snapshot = Snapshot::new();
                let initial = snapshot.diff(listing);
                self.snapshot = Some(snapshot);
                if self.config.emit_initial {
                    initial
                } else {
                    ChangeSet::new()
                }
            }
        }
    }

    fn log_start(&self, path: &Path) {
        info!(
            "Watching {} every {:?} ({} entries)",
            path.display(),
            self.config.poll_interval(),
            self.snapshot.as_ref().map_or(0, Snapshot::len)
        );
    }

    fn dispatch<H>(&self, changes: &ChangeSet, handler: &mut H)
    where
        H: ChangeHandler + ?Sized,
    {
        if changes.is_empty() {
            return;
        }
        debug!("Dispatching {} changes", changes.len());
        for change in changes {
            debug!("{change}");
            change.dispatch(handler);
        }
    }
}

fn log_scan_failure(err: &MonitorError) {
    warn!("Directory scan failed: {err}");
}

/// List the base names of every entry in `path`, in the order the
/// filesystem returns them.
pub fn read_entries(path: &Path) -> Result<Vec<OsString>> {
    let dir = std::fs::read_dir(path).map_err(|e| MonitorError::io(path, e))?;

    dir.map(|entry| {
        entry
            .map(|e| e.file_name())
            .map_err(|e| MonitorError::io(path, e))
    })
    .collect()
}

/// Async counterpart of [`read_entries`].
pub async fn read_entries_async(path: &Path) -> Result<Vec<OsString>> {
    let mut dir = tokio::fs::read_dir(path)
        .await
        .map_err(|e| MonitorError::io(path, e))?;

    let mut names = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| MonitorError::io(path, e))?
    {
        names.push(entry.file_name());
    }
    Ok(names)
}
