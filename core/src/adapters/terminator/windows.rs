//! Windows terminate primitive using process handles.
//!
//! - `OpenProcess(PROCESS_TERMINATE | PROCESS_QUERY_LIMITED_INFORMATION)`
//! - `TerminateProcess(handle, 0)`
//! - `CloseHandle` when the guard drops, whether or not termination succeeded

use tracing::{debug, warn};
use windows::Win32::Foundation::{
    CloseHandle, ERROR_INVALID_PARAMETER, HANDLE, STILL_ACTIVE,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, TerminateProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_TERMINATE,
};
use windows::core::HRESULT;

use crate::domain::TerminationOutcome;
use crate::error::{Error, Result};

use super::Terminator;

/// Closes a process handle on drop.
struct ProcessHandle(HANDLE);

impl ProcessHandle {
    /// Whether the process behind the handle has already exited.
    fn has_exited(&self) -> bool {
        let mut code = 0u32;
        // Safety: the handle is open with PROCESS_QUERY_LIMITED_INFORMATION
        match unsafe { GetExitCodeProcess(self.0, &mut code) } {
            Ok(()) => code != STILL_ACTIVE.0 as u32,
            Err(_) => false,
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // Safety: the handle came from OpenProcess and is closed once
        if let Err(e) = unsafe { CloseHandle(self.0) } {
            warn!(error = %e, "Failed to close process handle");
        }
    }
}

/// Windows process terminator.
#[derive(Debug, Default)]
pub struct HandleTerminator;

impl HandleTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl Terminator for HandleTerminator {
    fn terminate(&self, pid: u32) -> Result<TerminationOutcome> {
        // OpenProcess reports a pid with no live process as an invalid parameter
        let not_found = HRESULT::from(ERROR_INVALID_PARAMETER);

        // Safety: plain FFI call; the handle is owned by the guard
        let handle = match unsafe {
            OpenProcess(PROCESS_TERMINATE | PROCESS_QUERY_LIMITED_INFORMATION, false, pid)
        } {
            Ok(handle) => ProcessHandle(handle),
            Err(e) if e.code() == not_found => {
                debug!(pid = pid, "Process not found, already terminated");
                return Ok(TerminationOutcome::NotRunning);
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Failed to open process for termination");
                return Err(Error::TerminationDenied {
                    pid,
                    reason: e.message().to_string(),
                });
            }
        };

        // Safety: the handle is open with PROCESS_TERMINATE
        match unsafe { TerminateProcess(handle.0, 0) } {
            Ok(()) => {
                debug!(pid = pid, "TerminateProcess succeeded");
                Ok(TerminationOutcome::Terminated)
            }
            // Terminating an exited process fails with access denied
            Err(_) if handle.has_exited() => {
                debug!(pid = pid, "Process exited before termination");
                Ok(TerminationOutcome::NotRunning)
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "TerminateProcess failed");
                Err(Error::TerminationDenied {
                    pid,
                    reason: e.message().to_string(),
                })
            }
        }
    }
}
