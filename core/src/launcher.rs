//! Spawn a root process and discover its descendants.
//!
//! Children appear some time after the root is spawned, so discovery waits a
//! settle delay before the first snapshot and re-snapshots a bounded number
//! of times while the tree is still empty. This narrows the race but cannot
//! close it: a tree that is still empty after the last snapshot is returned
//! as empty.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::debug;

use crate::config::Config;
use crate::domain::DescendantSet;
use crate::error::{Error, Result};
use crate::ports::{ProcessTerminator, SnapshotSource};
use crate::ProcessTreeService;

/// Timing for descendant discovery after a spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Wait before the first snapshot.
    pub settle_delay: Duration,
    /// Extra snapshots while no descendants are visible.
    pub retries: u32,
    /// Wait between snapshots.
    pub retry_interval: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for LaunchOptions {
    fn from(config: &Config) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            retries: config.snapshot_retries,
            retry_interval: config.retry_interval(),
        }
    }
}

/// A spawned root and the descendants found after it settled.
#[derive(Debug)]
pub struct LaunchedTree {
    /// Handle to the root; dropping it does not terminate the process.
    pub child: Child,
    pub root_pid: u32,
    pub descendants: DescendantSet,
}

/// Spawn `program` with `args` and discover its descendants.
pub async fn launch<S, T>(
    service: &ProcessTreeService<S, T>,
    program: &str,
    args: &[String],
    options: LaunchOptions,
) -> Result<LaunchedTree>
where
    S: SnapshotSource,
    T: ProcessTerminator,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| Error::Spawn(format!("{}: {}", program, e)))?;

    let root_pid = child
        .id()
        .ok_or_else(|| Error::Spawn(format!("{} exited before its pid was read", program)))?;
    debug!(root_pid = root_pid, program = program, "Spawned root process");

    let descendants = discover(service, root_pid, options).await?;
    Ok(LaunchedTree {
        child,
        root_pid,
        descendants,
    })
}

/// Wait for the settle delay, then snapshot until descendants of `root_pid`
/// appear or the retries run out.
///
/// An unavailable snapshot is retried like an empty one; if it is still
/// unavailable after the last retry the error is returned.
pub async fn discover<S, T>(
    service: &ProcessTreeService<S, T>,
    root_pid: u32,
    options: LaunchOptions,
) -> Result<DescendantSet>
where
    S: SnapshotSource,
    T: ProcessTerminator,
{
    sleep(options.settle_delay).await;

    let mut attempt = 0;
    loop {
        let result = service.descendants(root_pid);
        let retry = match &result {
            Ok(set) => set.is_empty(),
            Err(e) => e.is_retryable(),
        };
        if !retry || attempt >= options.retries {
            return result;
        }

        attempt += 1;
        debug!(root_pid = root_pid, attempt = attempt, "No descendants yet, re-snapshotting");
        sleep(options.retry_interval).await;
    }
}
