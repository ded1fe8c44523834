//! Linux snapshot reader using procfs.
//!
//! Reads `/proc/<pid>/stat` for every numeric entry of `/proc`. The record
//! carries the same fields as a ToolHelp32 entry: pid, parent pid and the
//! executable name (`comm`).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{ProcessRecord, ProcessSnapshot};
use crate::error::{Error, Result};

use super::Reader;

/// Linux-specific snapshot reader.
pub struct ProcfsReader {
    root: PathBuf,
}

impl ProcfsReader {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Read from an alternate procfs mount (for testing).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Parse a `/proc/<pid>/stat` line.
    ///
    /// Format: `pid (comm) state ppid ...`. `comm` may itself contain spaces
    /// and parentheses, so it extends to the last `)`.
    fn parse_stat(content: &[u8]) -> Option<ProcessRecord> {
        let open = content.iter().position(|&b| b == b'(')?;
        let close = content.iter().rposition(|&b| b == b')')?;
        if close < open {
            return None;
        }

        let pid: u32 = std::str::from_utf8(&content[..open]).ok()?.trim().parse().ok()?;
        let name = String::from_utf8_lossy(&content[open + 1..close]).into_owned();

        let rest = std::str::from_utf8(&content[close + 1..]).ok()?;
        let mut fields = rest.split_whitespace();
        let _state = fields.next()?;
        let parent_pid: u32 = fields.next()?.parse().ok()?;

        Some(ProcessRecord::new(pid, parent_pid, name))
    }

    fn read_record(dir: &Path) -> Option<ProcessRecord> {
        match fs::read(dir.join("stat")) {
            Ok(content) => Self::parse_stat(&content),
            Err(e) => {
                // Processes exit between listing and reading; skip them
                if e.kind() != ErrorKind::NotFound {
                    tracing::debug!(
                        path = %dir.display(),
                        error = %e,
                        "Skipping unreadable process"
                    );
                }
                None
            }
        }
    }
}

impl Default for ProcfsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for ProcfsReader {
    fn capture(&self) -> Result<ProcessSnapshot> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            Error::SnapshotUnavailable(format!("cannot read {}: {}", self.root.display(), e))
        })?;

        let mut dirs: Vec<(u32, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let pid: u32 = entry.file_name().to_str()?.parse().ok()?;
                Some((pid, entry.path()))
            })
            .collect();
        // read_dir order is unspecified; pid order keeps snapshots reproducible
        dirs.sort_by_key(|(pid, _)| *pid);

        let records: Vec<ProcessRecord> = dirs
            .iter()
            .filter_map(|(_, dir)| Self::read_record(dir))
            .collect();

        tracing::debug!(count = records.len(), "Captured process snapshot");
        Ok(ProcessSnapshot::new(records))
    }
}
