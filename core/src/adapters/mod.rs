//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter wraps one operating-system facility.

pub mod snapshot;
pub mod terminator;

// Re-export main types for convenience
pub use snapshot::SystemSnapshot;
pub use terminator::SystemTerminator;
