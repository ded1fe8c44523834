//! Snapshot source port (interface).

use crate::domain::ProcessSnapshot;
use crate::error::Result;

/// Port for enumerating every process on the system.
///
/// Implementations take one system-wide snapshot per call and retain no
/// state between calls; any OS handle is acquired and released within
/// `capture`.
pub trait SnapshotSource: Send + Sync {
    /// Capture all processes visible to the caller.
    ///
    /// Fails with [`Error::SnapshotUnavailable`](crate::error::Error::SnapshotUnavailable)
    /// when the enumeration facility cannot be opened.
    fn capture(&self) -> Result<ProcessSnapshot>;
}
