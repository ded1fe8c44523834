//! Error types for the proctree-core library.

use thiserror::Error;

/// Result type alias for proctree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, resolving and terminating process trees.
///
/// A process that is already gone is not an error: the terminate primitive
/// reports it as [`TerminationOutcome::NotRunning`](crate::domain::TerminationOutcome).
#[derive(Error, Debug)]
pub enum Error {
    /// The system-wide process enumeration facility could not be opened.
    ///
    /// Retryable: a later snapshot may succeed.
    #[error("Process snapshot unavailable: {0}")]
    SnapshotUnavailable(String),

    /// The process exists but could not be opened or terminated.
    #[error("Termination of process {pid} denied: {reason}")]
    TerminationDenied { pid: u32, reason: String },

    /// Failed to spawn a root process.
    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::SnapshotUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TerminationDenied {
            pid: 1234,
            reason: "Access is denied".to_string(),
        };
        assert!(err.to_string().contains("1234"));
        assert!(err.to_string().contains("Access is denied"));

        let err = Error::SnapshotUnavailable("handle invalid".to_string());
        assert!(err.to_string().contains("handle invalid"));
    }

    #[test]
    fn test_only_snapshot_errors_are_retryable() {
        assert!(Error::SnapshotUnavailable("busy".to_string()).is_retryable());
        assert!(!Error::TerminationDenied {
            pid: 1,
            reason: "denied".to_string()
        }
        .is_retryable());
        assert!(!Error::Config("bad".to_string()).is_retryable());
    }
}
