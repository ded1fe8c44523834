//! Process terminator port (interface).

use crate::domain::TerminationOutcome;
use crate::error::Result;

/// Port for terminating a single process.
pub trait ProcessTerminator: Send + Sync {
    /// Issue one terminate request to `pid` without waiting for it to exit.
    ///
    /// * `Ok(Terminated)` - the request was issued
    /// * `Ok(NotRunning)` - no such process; nothing to do
    /// * `Err(TerminationDenied)` - the process exists but could not be terminated
    fn terminate(&self, pid: u32) -> Result<TerminationOutcome>;
}
