//! Snapshot reader adapters.
//!
//! Platform-specific implementations of system-wide process enumeration.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

use crate::domain::ProcessSnapshot;
use crate::error::Result;
use crate::ports::SnapshotSource;

/// The system snapshot reader for the current platform.
pub struct SystemSnapshot {
    #[cfg(target_os = "linux")]
    inner: linux::ProcfsReader,

    #[cfg(target_os = "windows")]
    inner: windows::ToolhelpReader,
}

impl SystemSnapshot {
    /// Create a new snapshot reader for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "linux")]
            inner: linux::ProcfsReader::new(),

            #[cfg(target_os = "windows")]
            inner: windows::ToolhelpReader::new(),
        }
    }

    /// Take one snapshot of every running process.
    pub fn capture(&self) -> Result<ProcessSnapshot> {
        self.inner.capture()
    }
}

impl Default for SystemSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for SystemSnapshot {
    fn capture(&self) -> Result<ProcessSnapshot> {
        self.inner.capture()
    }
}

/// Internal trait for platform-specific implementations.
trait Reader: Send + Sync {
    fn capture(&self) -> Result<ProcessSnapshot>;
}
