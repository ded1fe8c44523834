//! Termination outcomes and reports.

use serde::{Deserialize, Serialize};

use super::{Target, TerminationMode, TreeShape};

/// Result of one termination attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum TerminationOutcome {
    /// The terminate request was issued.
    Terminated,
    /// The process was not running; nothing was signalled.
    NotRunning,
    /// Opening or terminating the process failed.
    Denied { reason: String },
}

impl TerminationOutcome {
    /// Terminated and not-running both leave the target stopped.
    pub fn is_success(&self) -> bool {
        !matches!(self, TerminationOutcome::Denied { .. })
    }
}

impl std::fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationOutcome::Terminated => write!(f, "terminated"),
            TerminationOutcome::NotRunning => write!(f, "not running"),
            TerminationOutcome::Denied { reason } => write!(f, "denied: {}", reason),
        }
    }
}

/// One target and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationAttempt {
    pub target: Target,
    pub outcome: TerminationOutcome,
}

/// Everything `classify_and_terminate` did for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationReport {
    pub root_pid: u32,
    pub mode: TerminationMode,
    pub shape: TreeShape,
    pub attempts: Vec<TerminationAttempt>,
}

impl TerminationReport {
    /// True when no attempt was denied.
    pub fn is_success(&self) -> bool {
        self.attempts.iter().all(|a| a.outcome.is_success())
    }

    /// Number of targets a terminate request was issued to.
    pub fn terminated_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == TerminationOutcome::Terminated)
            .count()
    }

    /// Attempts that were denied.
    pub fn failures(&self) -> impl Iterator<Item = &TerminationAttempt> {
        self.attempts.iter().filter(|a| !a.outcome.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TargetRole;

    fn attempt(pid: u32, outcome: TerminationOutcome) -> TerminationAttempt {
        TerminationAttempt {
            target: Target {
                pid,
                name: None,
                role: TargetRole::Descendant,
            },
            outcome,
        }
    }

    #[test]
    fn test_report_success() {
        let report = TerminationReport {
            root_pid: 1,
            mode: TerminationMode::AllDescendants,
            shape: TreeShape::Simple,
            attempts: vec![
                attempt(2, TerminationOutcome::Terminated),
                attempt(3, TerminationOutcome::NotRunning),
            ],
        };
        assert!(report.is_success());
        assert_eq!(report.terminated_count(), 1);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_report_with_denied_attempt() {
        let report = TerminationReport {
            root_pid: 1,
            mode: TerminationMode::AllDescendants,
            shape: TreeShape::Simple,
            attempts: vec![
                attempt(2, TerminationOutcome::Terminated),
                attempt(
                    3,
                    TerminationOutcome::Denied {
                        reason: "Access is denied".to_string(),
                    },
                ),
            ],
        };
        assert!(!report.is_success());
        assert_eq!(report.failures().map(|a| a.target.pid).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_string(&TerminationOutcome::NotRunning).unwrap();
        assert_eq!(json, r#"{"status":"notRunning"}"#);
    }
}
