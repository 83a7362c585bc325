//! Change records produced by a scan.

use std::ffi::{OsStr, OsString};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::monitor::ChangeHandler;

/// A single detected change to the watched directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Change {
    /// Base name of the directory entry, exactly as the filesystem reports it.
    pub name: OsString,

    /// What happened to it.
    pub kind: ChangeKind,
}

impl Change {
    /// An entry that appeared.
    pub fn added(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            kind: ChangeKind::Added,
        }
    }

    /// An entry that disappeared.
    pub fn deleted(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            kind: ChangeKind::Deleted,
        }
    }

    /// Route this change to the matching handler method.
    pub fn dispatch<H: ChangeHandler + ?Sized>(&self, handler: &mut H) {
        match self.kind {
            ChangeKind::Added => handler.on_add(&self.name),
            ChangeKind::Deleted => handler.on_delete(&self.name),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name.to_string_lossy())
    }
}

/// Kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Entry is new since the previous scan.
    Added,

    /// Entry was present in the previous scan and is gone now.
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Deleted => f.write_str("deleted"),
        }
    }
}

/// Ordered changes from one scan: additions in listing order, then deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterate over the changes in dispatch order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Names of added entries.
    pub fn added(&self) -> impl Iterator<Item = &OsStr> {
        self.of_kind(ChangeKind::Added)
    }

    /// Names of deleted entries.
    pub fn deleted(&self) -> impl Iterator<Item = &OsStr> {
        self.of_kind(ChangeKind::Deleted)
    }

    fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &OsStr> {
        self.changes
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.name.as_os_str())
    }

    /// Dispatch every change to the handler, in order.
    pub fn dispatch<H: ChangeHandler + ?Sized>(&self, handler: &mut H) {
        for change in &self.changes {
            change.dispatch(handler);
        }
    }

    /// Consume the set, returning the underlying records.
    pub fn into_vec(self) -> Vec<Change> {
        self.changes
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = Change>>(iter: T) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}
