//! Process record and snapshot domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ProcessRecord
// ============================================================================

/// One process as seen by a single snapshot.
///
/// Values are captured at one instant and may be stale as soon as they are
/// read: the process can exit or spawn children at any time afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID.
    pub pid: u32,
    /// Parent process ID at snapshot time.
    pub parent_pid: u32,
    /// Executable file name (e.g. "notepad.exe"), lossily decoded.
    pub name: String,
}

impl ProcessRecord {
    /// Create a new process record.
    pub fn new(pid: u32, parent_pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            parent_pid,
            name: name.into(),
        }
    }

    /// Executable name with a trailing `.exe` removed, for display.
    pub fn display_name(&self) -> &str {
        let name = self.name.as_str();
        match name.len().checked_sub(4) {
            Some(split)
                if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(".exe") =>
            {
                &name[..split]
            }
            _ => name,
        }
    }
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.pid, self.name)
    }
}

// ============================================================================
// ProcessSnapshot
// ============================================================================

/// Every process visible to the caller at one point in time, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    records: Vec<ProcessRecord>,
    captured_at: DateTime<Utc>,
}

impl ProcessSnapshot {
    /// Create a snapshot from records, stamped with the current time.
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        Self::captured_at(records, Utc::now())
    }

    /// Create a snapshot with an explicit capture time.
    pub fn captured_at(records: Vec<ProcessRecord>, captured_at: DateTime<Utc>) -> Self {
        Self {
            records,
            captured_at,
        }
    }

    /// A snapshot containing no processes.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// When the snapshot was taken.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Records in enumeration order.
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the first record with the given pid.
    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.pid == pid)
    }

    /// Whether a process with this pid was running at snapshot time.
    pub fn contains(&self, pid: u32) -> bool {
        self.get(pid).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ProcessSnapshot {
    type Item = &'a ProcessRecord;
    type IntoIter = std::slice::Iter<'a, ProcessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ProcessRecord> for ProcessSnapshot {
    fn from_iter<I: IntoIterator<Item = ProcessRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_exe() {
        assert_eq!(ProcessRecord::new(1, 0, "notepad.exe").display_name(), "notepad");
        assert_eq!(ProcessRecord::new(1, 0, "CONHOST.EXE").display_name(), "CONHOST");
        assert_eq!(ProcessRecord::new(1, 0, "sleep").display_name(), "sleep");
        assert_eq!(ProcessRecord::new(1, 0, ".exe").display_name(), "");
        assert_eq!(ProcessRecord::new(1, 0, "ab").display_name(), "ab");
    }

    #[test]
    fn test_display() {
        let record = ProcessRecord::new(42, 1, "shell.exe");
        assert_eq!(record.to_string(), "42 (shell.exe)");
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot: ProcessSnapshot = vec![
            ProcessRecord::new(10, 1, "root.exe"),
            ProcessRecord::new(11, 10, "shell.exe"),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(11));
        assert!(!snapshot.contains(12));
        assert_eq!(snapshot.get(10).map(|r| r.name.as_str()), Some("root.exe"));
        assert!(ProcessSnapshot::empty().is_empty());
    }
}
