//! Print additions and deletions in a directory until Ctrl-C.
//!
//! Usage: cargo run -p codex-directory-monitor --example watch -- <DIR>

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use codex_directory_monitor::{Callbacks, CancellationToken, DirectoryMonitor, MonitorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Poll a directory and report added and deleted entries")]
struct Args {
    /// Directory to watch.
    dir: PathBuf,

    /// Milliseconds between scans.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Do not report entries that already exist at startup.
    #[arg(long)]
    skip_initial: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config =
        MonitorConfig::new().with_poll_interval(Duration::from_millis(args.interval_ms));
    if args.skip_initial {
        config = config.skip_initial();
    }
    let mut monitor = DirectoryMonitor::with_config(config)?;

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut handler = Callbacks::new(
        |name: &OsStr| println!("Added {}", name.to_string_lossy()),
        |name: &OsStr| println!("Deleted {}", name.to_string_lossy()),
    );

    monitor
        .watch_async(&args.dir, &mut handler, &token)
        .await
        .with_context(|| format!("watching {}", args.dir.display()))
}
