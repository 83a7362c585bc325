//! Presence snapshot of a directory and the per-scan diff.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

use tracing::trace;

use crate::event::{Change, ChangeSet};

/// Entry names of a watched directory, each with a "seen this pass" marker.
///
/// Names are kept as the raw [`OsString`] the filesystem returns, so entries
/// whose names are not valid UTF-8 stay distinct.
///
/// Between scans every marker is `false`. A scan sets the marker of each
/// listed entry; entries whose marker is still `false` afterwards have
/// disappeared.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: HashMap<OsString, bool>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the initial snapshot from a listing. All markers start `false`.
    pub fn from_listing<I, S>(listing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            entries: listing.into_iter().map(|name| (name.into(), false)).collect(),
        }
    }

    /// Diff a fresh listing against the snapshot and update it in place.
    ///
    /// Additions come first in listing order, followed by deletions in map
    /// order.
    pub fn diff<I, S>(&mut self, listing: I) -> ChangeSet
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut changes = ChangeSet::new();

        for name in listing {
            let name = name.into();
            match self.entries.get_mut(&name) {
                Some(seen) => *seen = true,
                None => {
                    trace!(name = ?name, "new entry");
                    changes.push(Change::added(name.clone()));
                    self.entries.insert(name, true);
                }
            }
        }

        let mut gone = Vec::new();
        self.entries.retain(|name, seen| {
            if !*seen {
                gone.push(name.clone());
            }
            *seen
        });
        for name in gone {
            trace!(name = ?name, "entry removed");
            changes.push(Change::deleted(name));
        }

        for seen in self.entries.values_mut() {
            *seen = false;
        }

        changes
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot tracks no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an entry is tracked.
    pub fn contains(&self, name: impl AsRef<OsStr>) -> bool {
        self.entries.contains_key(name.as_ref())
    }

    /// Tracked entry names, sorted.
    pub fn names(&self) -> Vec<&OsStr> {
        let mut names: Vec<&OsStr> = self.entries.keys().map(OsString::as_os_str).collect();
        names.sort_unstable();
        names
    }

    #[cfg(test)]
    fn all_unmarked(&self) -> bool {
        self.entries.values().all(|seen| !*seen)
    }
}
