//! proctree Core Library
//!
//! Discovers the descendants of a spawned root process from a single
//! system-wide snapshot and terminates the resulting tree safely.
//! Provides functionality to:
//! - Snapshot every running process (pid, parent pid, executable name)
//! - Resolve the descendants of a root pid in stable discovery order
//! - Classify the tree (simple vs. fan-out application) and terminate the
//!   root, a named descendant, the compatibility-layer process, or all of them
//! - Spawn a root and wait for its children to appear
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Operating-system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Windows: ToolHelp32 snapshots, `OpenProcess` / `TerminateProcess`
//! - Linux: `/proc` snapshots, `kill(2)` with SIGKILL

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;
pub mod launcher;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
compile_error!("Unsupported platform: only Linux and Windows are supported");

// Re-export domain types (primary API)
pub use domain::{
    resolve, DescendantSet, ParentIndex, ProcessRecord, ProcessSnapshot, Target, TargetRole,
    TerminationAttempt, TerminationMode, TerminationOutcome, TerminationPlan, TerminationPolicy,
    TerminationReport, TreeShape,
};

// Re-export other commonly used types
pub use adapters::{SystemSnapshot, SystemTerminator};
pub use application::ProcessTreeService;
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use launcher::{launch, LaunchOptions, LaunchedTree};
pub use ports::{ProcessTerminator, SnapshotSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Take one snapshot of every running process.
pub fn capture() -> Result<ProcessSnapshot> {
    SystemSnapshot::new().capture()
}

/// Capture a snapshot and resolve the descendants of `root_pid`.
pub fn descendants_of(root_pid: u32) -> Result<DescendantSet> {
    Ok(resolve(&capture()?, root_pid))
}

/// Terminate the tree under `root_pid` with the default policy.
pub fn classify_and_terminate(root_pid: u32, mode: TerminationMode) -> Result<TerminationReport> {
    ProcessTreeService::system(TerminationPolicy::default()).terminate_tree(root_pid, mode)
}
