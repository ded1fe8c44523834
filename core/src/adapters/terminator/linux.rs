//! Linux terminate primitive using `kill(2)`.
//!
//! SIGKILL is the closest match to `TerminateProcess`: immediate and not
//! interceptable by the target.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::domain::TerminationOutcome;
use crate::error::{Error, Result};

use super::Terminator;

/// Linux process terminator.
#[derive(Debug, Default)]
pub struct SignalTerminator;

impl SignalTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl Terminator for SignalTerminator {
    fn terminate(&self, pid: u32) -> Result<TerminationOutcome> {
        // Pids above i32::MAX cannot exist; a negative pid would address a process group
        let Ok(raw) = i32::try_from(pid) else {
            debug!(pid = pid, "Pid out of range, nothing to terminate");
            return Ok(TerminationOutcome::NotRunning);
        };

        match kill(Pid::from_raw(raw), Signal::SIGKILL) {
            Ok(()) => {
                debug!(pid = pid, "SIGKILL sent");
                Ok(TerminationOutcome::Terminated)
            }
            Err(Errno::ESRCH) => {
                debug!(pid = pid, "Process not found, already terminated");
                Ok(TerminationOutcome::NotRunning)
            }
            Err(errno) => {
                warn!(pid = pid, error = %errno, "Failed to terminate process");
                Err(Error::TerminationDenied {
                    pid,
                    reason: errno.desc().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_terminate_child_process() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let outcome = SignalTerminator::new().terminate(child.id()).unwrap();
        assert_eq!(outcome, TerminationOutcome::Terminated);

        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[test]
    fn test_terminate_nonexistent_process() {
        // Above the kernel's pid_max ceiling (4194304)
        let outcome = SignalTerminator::new().terminate(99_999_999).unwrap();
        assert_eq!(outcome, TerminationOutcome::NotRunning);
    }

    #[test]
    fn test_out_of_range_pid() {
        let outcome = SignalTerminator::new().terminate(u32::MAX).unwrap();
        assert_eq!(outcome, TerminationOutcome::NotRunning);
    }
}
