//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod outcome;
mod policy;
mod process;
mod tree;

// Re-export all domain types
pub use outcome::{TerminationAttempt, TerminationOutcome, TerminationReport};
pub use policy::{
    Target, TargetRole, TerminationMode, TerminationPlan, TerminationPolicy, TreeShape,
    DEFAULT_COMPAT_LAYER_INDEX, DEFAULT_FAN_OUT_THRESHOLD,
};
pub use process::{ProcessRecord, ProcessSnapshot};
pub use tree::{resolve, DescendantSet, ParentIndex};
