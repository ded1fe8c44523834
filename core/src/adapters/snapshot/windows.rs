//! Windows snapshot reader using the ToolHelp32 API.
//!
//! - `CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS)` opens the enumeration handle
//! - `Process32FirstW` / `Process32NextW` walk it once
//! - the handle is closed when the guard drops, on every exit path

use windows::Win32::Foundation::{CloseHandle, ERROR_NO_MORE_FILES, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::core::HRESULT;

use crate::domain::{ProcessRecord, ProcessSnapshot};
use crate::error::{Error, Result};

use super::Reader;

/// Closes a snapshot handle on drop.
struct SnapshotHandle(HANDLE);

impl Drop for SnapshotHandle {
    fn drop(&mut self) {
        // Safety: the handle came from CreateToolhelp32Snapshot and is closed once
        if let Err(e) = unsafe { CloseHandle(self.0) } {
            tracing::warn!(error = %e, "Failed to close process snapshot handle");
        }
    }
}

/// Windows-specific snapshot reader.
pub struct ToolhelpReader;

impl ToolhelpReader {
    pub fn new() -> Self {
        Self
    }

    fn record(entry: &PROCESSENTRY32W) -> ProcessRecord {
        let len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        ProcessRecord::new(
            entry.th32ProcessID,
            entry.th32ParentProcessID,
            String::from_utf16_lossy(&entry.szExeFile[..len]),
        )
    }
}

impl Default for ToolhelpReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for ToolhelpReader {
    fn capture(&self) -> Result<ProcessSnapshot> {
        // Safety: plain FFI call; the returned handle is owned by the guard below
        let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| Error::SnapshotUnavailable(e.to_string()))?;
        if handle.is_invalid() {
            return Err(Error::SnapshotUnavailable(
                "CreateToolhelp32Snapshot returned an invalid handle".to_string(),
            ));
        }
        let snapshot = SnapshotHandle(handle);

        let no_more_files = HRESULT::from(ERROR_NO_MORE_FILES);
        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };
        let mut records = Vec::new();

        // Safety: `entry` is a properly sized PROCESSENTRY32W owned by this frame
        let mut next = unsafe { Process32FirstW(snapshot.0, &mut entry) };
        loop {
            match next {
                Ok(()) => records.push(Self::record(&entry)),
                Err(e) if e.code() == no_more_files => break,
                Err(e) => {
                    return Err(Error::SnapshotUnavailable(format!(
                        "process enumeration failed: {}",
                        e
                    )))
                }
            }
            // Safety: as above
            next = unsafe { Process32NextW(snapshot.0, &mut entry) };
        }

        tracing::debug!(count = records.len(), "Captured process snapshot");
        Ok(ProcessSnapshot::new(records))
    }
}
