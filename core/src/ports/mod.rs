//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the operating system. Implementations live in `adapters`.

mod snapshot;
mod terminator;

pub use snapshot::SnapshotSource;
pub use terminator::ProcessTerminator;
