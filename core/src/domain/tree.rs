//! Parent index and descendant resolution.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProcessRecord, ProcessSnapshot};

// ============================================================================
// ParentIndex
// ============================================================================

/// Mapping from parent pid to its children, in snapshot order.
///
/// Rebuilt for every resolution; borrows the snapshot it was built from.
#[derive(Debug)]
pub struct ParentIndex<'a> {
    children: HashMap<u32, Vec<&'a ProcessRecord>>,
    present: HashSet<u32>,
    captured_at: DateTime<Utc>,
}

impl<'a> ParentIndex<'a> {
    /// Build the index in one pass over the snapshot.
    pub fn build(snapshot: &'a ProcessSnapshot) -> Self {
        let mut children: HashMap<u32, Vec<&'a ProcessRecord>> =
            HashMap::with_capacity(snapshot.len());
        let mut present = HashSet::with_capacity(snapshot.len());
        for record in snapshot {
            children.entry(record.parent_pid).or_default().push(record);
            present.insert(record.pid);
        }
        Self {
            children,
            present,
            captured_at: snapshot.timestamp(),
        }
    }

    /// Whether `pid` was running when the snapshot was taken.
    pub fn contains(&self, pid: u32) -> bool {
        self.present.contains(&pid)
    }

    /// Direct children of `pid`; empty for a leaf or unknown pid.
    pub fn children_of(&self, pid: u32) -> &[&'a ProcessRecord] {
        self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pre-order traversal from `root_pid`.
    ///
    /// Each child is emitted before its own subtree, siblings in snapshot
    /// order. A pid is emitted at most once and the root never is, so a
    /// racy snapshot containing a cycle still terminates.
    pub fn descendants_of(&self, root_pid: u32) -> DescendantSet {
        let mut visited = HashSet::from([root_pid]);
        let mut records = Vec::new();
        let mut stack: Vec<&ProcessRecord> =
            self.children_of(root_pid).iter().rev().copied().collect();

        while let Some(record) = stack.pop() {
            if !visited.insert(record.pid) {
                continue;
            }
            records.push(record.clone());
            stack.extend(self.children_of(record.pid).iter().rev().copied());
        }

        DescendantSet {
            root_pid,
            root_present: self.contains(root_pid),
            captured_at: self.captured_at,
            records,
        }
    }
}

/// Resolve every descendant of `root_pid` in `snapshot`.
///
/// An unknown root or an empty snapshot yields an empty set.
pub fn resolve(snapshot: &ProcessSnapshot, root_pid: u32) -> DescendantSet {
    ParentIndex::build(snapshot).descendants_of(root_pid)
}

// ============================================================================
// DescendantSet
// ============================================================================

/// Processes reachable from a root pid, in discovery order.
///
/// Positions are stable for a given snapshot; termination policies index
/// into this sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescendantSet {
    root_pid: u32,
    root_present: bool,
    captured_at: DateTime<Utc>,
    records: Vec<ProcessRecord>,
}

impl DescendantSet {
    /// The root the set was resolved from (never a member).
    pub fn root_pid(&self) -> u32 {
        self.root_pid
    }

    /// Whether the root itself was in the snapshot.
    ///
    /// A missing root has exited, and its pid may since have been reused.
    pub fn root_present(&self) -> bool {
        self.root_present
    }

    /// When the underlying snapshot was taken.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Descendant at a discovery position.
    pub fn get(&self, index: usize) -> Option<&ProcessRecord> {
        self.records.get(index)
    }

    pub fn find(&self, pid: u32) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.pid == pid)
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.find(pid).is_some()
    }

    /// Pids in discovery order.
    pub fn pids(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.pid).collect()
    }

    pub fn as_slice(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DescendantSet {
    type Item = &'a ProcessRecord;
    type IntoIter = std::slice::Iter<'a, ProcessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(records: &[(u32, u32, &str)]) -> ProcessSnapshot {
        records
            .iter()
            .map(|&(pid, ppid, name)| ProcessRecord::new(pid, ppid, name))
            .collect()
    }

    #[test]
    fn test_resolve_chain() {
        let snap = snapshot(&[
            (10, 1, "root.exe"),
            (11, 10, "shell.exe"),
            (12, 11, "leaf.exe"),
        ]);

        let set = resolve(&snap, 10);
        assert_eq!(
            set.as_slice(),
            &[
                ProcessRecord::new(11, 10, "shell.exe"),
                ProcessRecord::new(12, 11, "leaf.exe"),
            ]
        );
        assert_eq!(set.root_pid(), 10);
        assert!(set.root_present());
    }

    #[test]
    fn test_resolve_pre_order_siblings_in_snapshot_order() {
        // 10 -> [20, 30]; 20 -> [21, 22]; 30 -> [31]
        let snap = snapshot(&[
            (30, 10, "b.exe"),
            (21, 20, "a1.exe"),
            (20, 10, "a.exe"),
            (31, 30, "b1.exe"),
            (22, 20, "a2.exe"),
        ]);

        // 30 is encountered before 20 in the snapshot
        assert_eq!(resolve(&snap, 10).pids(), vec![30, 31, 20, 21, 22]);
    }

    #[test]
    fn test_unknown_root_is_empty() {
        let snap = snapshot(&[(10, 1, "root.exe"), (11, 10, "shell.exe")]);
        let set = resolve(&snap, 999);
        assert!(set.is_empty());
        assert_eq!(set.root_pid(), 999);
        assert!(!set.root_present());
    }

    #[test]
    fn test_empty_snapshot_is_empty() {
        let set = resolve(&ProcessSnapshot::empty(), 10);
        assert!(set.is_empty());
        assert!(!set.root_present());
    }

    #[test]
    fn test_exited_root_with_orphans_is_not_present() {
        // Children keep the parent pid of a root that has already exited
        let snap = snapshot(&[(11, 10, "shell.exe"), (12, 11, "leaf.exe")]);

        let set = resolve(&snap, 10);
        assert_eq!(set.pids(), vec![11, 12]);
        assert!(!set.root_present());
    }

    #[test]
    fn test_set_carries_capture_time() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let snap = ProcessSnapshot::captured_at(vec![ProcessRecord::new(10, 1, "root.exe")], at);

        assert_eq!(resolve(&snap, 10).captured_at(), at);
    }

    #[test]
    fn test_root_never_included() {
        // Windows reports the idle process as its own parent
        let snap = snapshot(&[
            (0, 0, "[System Process]"),
            (4, 0, "System"),
            (100, 4, "smss.exe"),
        ]);

        let set = resolve(&snap, 0);
        assert_eq!(set.pids(), vec![4, 100]);
        assert!(!set.contains(0));
    }

    #[test]
    fn test_cycle_terminates() {
        // Pid reuse between reads can produce a spurious cycle
        let snap = snapshot(&[
            (10, 1, "root.exe"),
            (11, 10, "a.exe"),
            (12, 11, "b.exe"),
            (11, 12, "a.exe"),
        ]);

        let set = resolve(&snap, 10);
        assert_eq!(set.pids(), vec![11, 12]);
    }

    #[test]
    fn test_cycle_back_to_root_excludes_root() {
        let snap = snapshot(&[(10, 12, "root.exe"), (11, 10, "a.exe"), (12, 11, "b.exe")]);

        let set = resolve(&snap, 10);
        assert_eq!(set.pids(), vec![11, 12]);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let snap = snapshot(&[
            (10, 1, "root.exe"),
            (11, 10, "a.exe"),
            (12, 10, "b.exe"),
            (13, 11, "c.exe"),
            (14, 12, "d.exe"),
        ]);

        let first = resolve(&snap, 10);
        for _ in 0..10 {
            assert_eq!(resolve(&snap, 10), first);
        }
    }

    #[test]
    fn test_parent_index_children() {
        let snap = snapshot(&[(10, 1, "root.exe"), (11, 10, "a.exe"), (12, 10, "b.exe")]);
        let index = ParentIndex::build(&snap);

        let children: Vec<u32> = index.children_of(10).iter().map(|r| r.pid).collect();
        assert_eq!(children, vec![11, 12]);
        assert!(index.children_of(11).is_empty());
    }
}
