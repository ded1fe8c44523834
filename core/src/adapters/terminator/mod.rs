//! Process terminator adapters.
//!
//! Platform-specific implementations of the terminate primitive.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

use crate::domain::TerminationOutcome;
use crate::error::Result;
use crate::ports::ProcessTerminator;

/// The system process terminator for the current platform.
pub struct SystemTerminator {
    #[cfg(target_os = "linux")]
    inner: linux::SignalTerminator,

    #[cfg(target_os = "windows")]
    inner: windows::HandleTerminator,
}

impl SystemTerminator {
    /// Create a new terminator for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "linux")]
            inner: linux::SignalTerminator::new(),

            #[cfg(target_os = "windows")]
            inner: windows::HandleTerminator::new(),
        }
    }

    /// Terminate a process by PID.
    pub fn terminate(&self, pid: u32) -> Result<TerminationOutcome> {
        if pid == 0 {
            return Err(crate::error::Error::TerminationDenied {
                pid,
                reason: "refusing to terminate pid 0".to_string(),
            });
        }
        self.inner.terminate(pid)
    }
}

impl Default for SystemTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTerminator for SystemTerminator {
    fn terminate(&self, pid: u32) -> Result<TerminationOutcome> {
        SystemTerminator::terminate(self, pid)
    }
}

/// Internal trait for platform-specific implementations.
trait Terminator: Send + Sync {
    fn terminate(&self, pid: u32) -> Result<TerminationOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_zero_is_refused() {
        let result = SystemTerminator::new().terminate(0);
        assert!(matches!(
            result,
            Err(crate::error::Error::TerminationDenied { pid: 0, .. })
        ));
    }
}
