//! Process tree application service.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::adapters::{SystemSnapshot, SystemTerminator};
use crate::config::Config;
use crate::domain::{
    resolve, DescendantSet, ProcessSnapshot, TerminationAttempt, TerminationMode,
    TerminationOutcome, TerminationPolicy, TerminationReport, TreeShape,
};
use crate::error::{Error, Result};
use crate::ports::{ProcessTerminator, SnapshotSource};

/// Application service for discovering and terminating process trees.
///
/// Stateless between calls: every discovery takes a fresh snapshot.
/// The snapshot source and terminator are injected through the port traits,
/// allowing different implementations to be used in tests.
pub struct ProcessTreeService<S: SnapshotSource, T: ProcessTerminator> {
    source: S,
    terminator: T,
    policy: TerminationPolicy,
    lenient_snapshot: bool,
}

impl ProcessTreeService<SystemSnapshot, SystemTerminator> {
    /// Service backed by the operating system with the given policy.
    pub fn system(policy: TerminationPolicy) -> Self {
        Self::new(SystemSnapshot::new(), SystemTerminator::new(), policy)
    }

    /// Service backed by the operating system, configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::system(config.policy()).with_lenient_snapshot(config.lenient_snapshot)
    }
}

impl<S: SnapshotSource, T: ProcessTerminator> ProcessTreeService<S, T> {
    /// Create a new service with the given snapshot source and terminator.
    pub fn new(source: S, terminator: T, policy: TerminationPolicy) -> Self {
        Self {
            source,
            terminator,
            policy,
            lenient_snapshot: false,
        }
    }

    /// When enabled, an unavailable snapshot is treated as an empty one.
    pub fn with_lenient_snapshot(mut self, lenient: bool) -> Self {
        self.lenient_snapshot = lenient;
        self
    }

    pub fn policy(&self) -> &TerminationPolicy {
        &self.policy
    }

    /// Take one snapshot of every running process.
    pub fn capture(&self) -> Result<ProcessSnapshot> {
        match self.source.capture() {
            Err(Error::SnapshotUnavailable(reason)) if self.lenient_snapshot => {
                warn!(%reason, "Snapshot unavailable, continuing with an empty process list");
                Ok(ProcessSnapshot::empty())
            }
            result => result,
        }
    }

    /// Capture a snapshot and resolve the descendants of `root_pid`.
    pub fn descendants(&self, root_pid: u32) -> Result<DescendantSet> {
        let snapshot = self.capture()?;
        let descendants = resolve(&snapshot, root_pid);
        debug!(
            root_pid = root_pid,
            captured_at = %snapshot.timestamp(),
            processes = snapshot.len(),
            descendants = descendants.len(),
            "Resolved process tree"
        );
        Ok(descendants)
    }

    /// Classify a resolved tree with the configured policy.
    pub fn classify(&self, descendants: &DescendantSet) -> TreeShape {
        self.policy.classify(descendants)
    }

    /// Terminate one pid, folding errors into the outcome.
    pub fn terminate(&self, pid: u32) -> TerminationOutcome {
        match self.terminator.terminate(pid) {
            Ok(outcome) => outcome,
            Err(Error::TerminationDenied { reason, .. }) => TerminationOutcome::Denied { reason },
            Err(e) => TerminationOutcome::Denied {
                reason: e.to_string(),
            },
        }
    }

    /// Pick target(s) for `mode` from the tree shape and terminate them.
    ///
    /// Every target is signalled at most once and never retried. A
    /// selected pid that was not in the snapshot (a descendant outside the
    /// tree, or a root that has exited) is reported as not running without
    /// being signalled.
    pub fn classify_and_terminate(
        &self,
        descendants: &DescendantSet,
        mode: TerminationMode,
    ) -> TerminationReport {
        let plan = self.policy.plan(descendants, mode);
        let mut attempts = Vec::with_capacity(plan.targets.len() + 1);

        if let Some(target) = plan.absent {
            debug!(
                pid = target.pid,
                role = ?target.role,
                "Process not in snapshot, not signalling"
            );
            attempts.push(TerminationAttempt {
                target,
                outcome: TerminationOutcome::NotRunning,
            });
        }

        let mut signalled = HashSet::new();
        for target in plan.targets {
            if !signalled.insert(target.pid) {
                continue;
            }
            let outcome = self.terminate(target.pid);
            info!(
                pid = target.pid,
                role = ?target.role,
                outcome = %outcome,
                "Termination attempt"
            );
            attempts.push(TerminationAttempt { target, outcome });
        }

        TerminationReport {
            root_pid: descendants.root_pid(),
            mode,
            shape: plan.shape,
            attempts,
        }
    }

    /// Resolve the tree under `root_pid` and terminate according to `mode`.
    pub fn terminate_tree(
        &self,
        root_pid: u32,
        mode: TerminationMode,
    ) -> Result<TerminationReport> {
        let descendants = self.descendants(root_pid)?;
        Ok(self.classify_and_terminate(&descendants, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::domain::{ProcessRecord, TargetRole};

    /// Mock snapshot source for testing.
    struct MockSource {
        records: Option<Vec<ProcessRecord>>,
    }

    impl MockSource {
        fn new(records: &[(u32, u32, &str)]) -> Self {
            Self {
                records: Some(
                    records
                        .iter()
                        .map(|&(pid, ppid, name)| ProcessRecord::new(pid, ppid, name))
                        .collect(),
                ),
            }
        }

        fn unavailable() -> Self {
            Self { records: None }
        }
    }

    impl SnapshotSource for MockSource {
        fn capture(&self) -> Result<ProcessSnapshot> {
            match &self.records {
                Some(records) => Ok(ProcessSnapshot::new(records.clone())),
                None => Err(Error::SnapshotUnavailable("mock".to_string())),
            }
        }
    }

    /// Terminator that records every pid it is asked to terminate.
    ///
    /// Pids in `running` are terminated once; pids in `protected` are denied.
    struct RecordingTerminator {
        running: Mutex<HashSet<u32>>,
        protected: HashSet<u32>,
        calls: Mutex<Vec<u32>>,
    }

    impl RecordingTerminator {
        fn new(running: &[u32]) -> Self {
            Self {
                running: Mutex::new(running.iter().copied().collect()),
                protected: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn protect(mut self, pid: u32) -> Self {
            self.protected.insert(pid);
            self
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessTerminator for RecordingTerminator {
        fn terminate(&self, pid: u32) -> Result<TerminationOutcome> {
            self.calls.lock().unwrap().push(pid);
            if self.protected.contains(&pid) {
                return Err(Error::TerminationDenied {
                    pid,
                    reason: "Access is denied".to_string(),
                });
            }
            if self.running.lock().unwrap().remove(&pid) {
                Ok(TerminationOutcome::Terminated)
            } else {
                Ok(TerminationOutcome::NotRunning)
            }
        }
    }

    const CHAIN: &[(u32, u32, &str)] = &[
        (1, 0, "init"),
        (10, 1, "root.exe"),
        (11, 10, "shell.exe"),
        (12, 11, "leaf.exe"),
    ];

    /// Root 10 fanning out into five processes, the compatibility layer fourth.
    const FAN_OUT: &[(u32, u32, &str)] = &[
        (10, 1, "headless-tty.exe"),
        (11, 10, "cmd.exe"),
        (12, 11, "conhost.exe"),
        (13, 11, "notepad.exe"),
        (14, 10, "conhost.exe"),
        (15, 14, "Notepad.exe"),
    ];

    fn service(
        records: &[(u32, u32, &str)],
        running: &[u32],
    ) -> ProcessTreeService<MockSource, RecordingTerminator> {
        ProcessTreeService::new(
            MockSource::new(records),
            RecordingTerminator::new(running),
            TerminationPolicy::default(),
        )
    }

    #[test]
    fn test_descendants() {
        let service = service(CHAIN, &[]);
        let set = service.descendants(10).unwrap();
        assert_eq!(set.pids(), vec![11, 12]);
        assert_eq!(service.classify(&set), TreeShape::Simple);
    }

    #[test]
    fn test_strict_snapshot_surfaces_error() {
        let service = ProcessTreeService::new(
            MockSource::unavailable(),
            RecordingTerminator::new(&[]),
            TerminationPolicy::default(),
        );
        let err = service.descendants(10).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_lenient_snapshot_yields_empty_set() {
        let service = ProcessTreeService::new(
            MockSource::unavailable(),
            RecordingTerminator::new(&[]),
            TerminationPolicy::default(),
        )
        .with_lenient_snapshot(true);
        assert!(service.descendants(10).unwrap().is_empty());
    }

    #[test]
    fn test_simple_tree_terminates_root() {
        let service = service(CHAIN, &[10, 11, 12]);
        let report = service.terminate_tree(10, TerminationMode::RootOrCompatLayer).unwrap();

        assert_eq!(report.shape, TreeShape::Simple);
        assert_eq!(service.terminator.calls(), vec![10]);
        assert_eq!(report.attempts[0].target.role, TargetRole::Root);
        assert_eq!(report.attempts[0].outcome, TerminationOutcome::Terminated);
        assert!(report.is_success());
    }

    #[test]
    fn test_fan_out_tree_terminates_compat_layer() {
        let service = service(FAN_OUT, &[10, 11, 12, 13, 14, 15]);
        let set = service.descendants(10).unwrap();
        assert_eq!(set.pids(), vec![11, 12, 13, 14, 15]);

        let report = service.classify_and_terminate(&set, TerminationMode::RootOrCompatLayer);
        assert_eq!(report.shape, TreeShape::FanOut);
        assert_eq!(service.terminator.calls(), vec![14]);
        assert_eq!(report.attempts[0].target.role, TargetRole::CompatLayer);
        assert_eq!(report.attempts[0].target.name.as_deref(), Some("conhost.exe"));
    }

    #[test]
    fn test_direct_child() {
        let service = service(CHAIN, &[12]);
        let set = service.descendants(10).unwrap();

        let mode = TerminationMode::DirectChild { pid: 12 };
        let report = service.classify_and_terminate(&set, mode);
        assert_eq!(service.terminator.calls(), vec![12]);
        assert_eq!(report.terminated_count(), 1);
    }

    #[test]
    fn test_direct_child_outside_tree_is_not_signalled() {
        let service = service(CHAIN, &[1]);
        let set = service.descendants(10).unwrap();

        let mode = TerminationMode::DirectChild { pid: 1 };
        let report = service.classify_and_terminate(&set, mode);
        assert!(service.terminator.calls().is_empty());
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].outcome, TerminationOutcome::NotRunning);
        assert!(report.is_success());
    }

    #[test]
    fn test_terminating_twice_is_idempotent() {
        let service = service(CHAIN, &[12]);
        let set = service.descendants(10).unwrap();
        let mode = TerminationMode::DirectChild { pid: 12 };

        let first = service.classify_and_terminate(&set, mode);
        let second = service.classify_and_terminate(&set, mode);

        assert_eq!(first.attempts[0].outcome, TerminationOutcome::Terminated);
        assert_eq!(second.attempts[0].outcome, TerminationOutcome::NotRunning);
        assert!(second.is_success());
    }

    #[test]
    fn test_all_descendants_continues_past_denied() {
        let terminator = RecordingTerminator::new(&[11, 12, 13, 14, 15]).protect(12);
        let service = ProcessTreeService::new(
            MockSource::new(FAN_OUT),
            terminator,
            TerminationPolicy::default(),
        );

        let report = service.terminate_tree(10, TerminationMode::AllDescendants).unwrap();
        assert_eq!(service.terminator.calls(), vec![11, 12, 13, 14, 15]);
        assert!(!report.is_success());
        assert_eq!(report.terminated_count(), 4);
        assert_eq!(
            report.failures().next().map(|a| &a.outcome),
            Some(&TerminationOutcome::Denied {
                reason: "Access is denied".to_string()
            })
        );
    }

    #[test]
    fn test_exited_root_is_not_signalled() {
        // 999 is live to the terminator: its pid was reused after the snapshot
        let service = service(CHAIN, &[999]);
        let report = service.terminate_tree(999, TerminationMode::RootOrCompatLayer).unwrap();

        assert!(service.terminator.calls().is_empty());
        assert_eq!(report.shape, TreeShape::Simple);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].target.pid, 999);
        assert_eq!(report.attempts[0].target.role, TargetRole::Root);
        assert_eq!(report.attempts[0].outcome, TerminationOutcome::NotRunning);
        assert!(report.is_success());
    }

    #[test]
    fn test_lenient_snapshot_never_signals_root() {
        let service = ProcessTreeService::new(
            MockSource::unavailable(),
            RecordingTerminator::new(&[10]),
            TerminationPolicy::default(),
        )
        .with_lenient_snapshot(true);

        let report = service.terminate_tree(10, TerminationMode::RootOrCompatLayer).unwrap();
        assert!(service.terminator.calls().is_empty());
        assert_eq!(report.attempts[0].outcome, TerminationOutcome::NotRunning);
    }
}
