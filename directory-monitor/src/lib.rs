//! # Directory Monitor
//!
//! Polling-based monitoring of a single directory. The monitor lists the
//! directory at a fixed interval, diffs the listing against the previous
//! one and reports added and deleted entries by name.
//!
//! ## Features
//!
//! - **Presence Tracking**: Entries are compared by raw base name only
//! - **Initial Batch**: Entries present at startup are reported as additions
//! - **Blocking or Async**: Run on a dedicated thread or on tokio
//! - **Cancellation**: Stop a watch cleanly with a `CancellationToken`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Monitor                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  MonitorConfig ──► DirectoryMonitor ──► ChangeSet              │
//! │                         │                   │                   │
//! │                         ▼                   ▼                   │
//! │                     Snapshot          ChangeHandler             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codex_directory_monitor::DirectoryMonitor;
//!
//! let mut monitor = DirectoryMonitor::new();
//! let err = monitor
//!     .watch(
//!         "test",
//!         |name| println!("Added {}", name.to_string_lossy()),
//!         |name| println!("Deleted {}", name.to_string_lossy()),
//!     )
//!     .unwrap_err();
//! eprintln!("{err}");
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod snapshot;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use event::{Change, ChangeKind, ChangeSet};
pub use monitor::{Callbacks, ChangeHandler, DirectoryMonitor};
pub use snapshot::Snapshot;

// Re-exported so callers of the cancellable watch loops need no extra dependency.
pub use tokio_util::sync::CancellationToken;
