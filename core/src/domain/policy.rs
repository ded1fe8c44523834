//! Termination policy: tree-shape classification and target selection.
//!
//! Some packaged applications detach from the process that launched them:
//! once they fan out into several cooperating processes, terminating the root
//! no longer tears the group down. For those trees the policy targets the
//! compatibility-layer process at a fixed discovery position instead, whose
//! exit the rest of the group follows.
//!
//! The threshold and index are empirical and come from configuration.

use serde::{Deserialize, Serialize};

use super::DescendantSet;

/// Descendant count above which a tree is treated as a fan-out application.
pub const DEFAULT_FAN_OUT_THRESHOLD: usize = 3;

/// Discovery position of the compatibility-layer process in a fan-out tree.
pub const DEFAULT_COMPAT_LAYER_INDEX: usize = 3;

// ============================================================================
// TreeShape
// ============================================================================

/// Shape of a resolved process tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeShape {
    /// Root with a small number of descendants; terminating the root is enough.
    Simple,
    /// Multi-process application; terminating the root will not stop it.
    FanOut,
}

impl TreeShape {
    pub fn display_name(&self) -> &'static str {
        match self {
            TreeShape::Simple => "simple",
            TreeShape::FanOut => "multi-process application",
        }
    }
}

impl std::fmt::Display for TreeShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// TerminationMode
// ============================================================================

/// Which process(es) of a tree to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum TerminationMode {
    /// Exactly one named descendant, e.g. the user-facing leaf.
    DirectChild { pid: u32 },
    /// The root, or the compatibility-layer descendant for fan-out trees.
    RootOrCompatLayer,
    /// Every descendant, in discovery order.
    AllDescendants,
}

// ============================================================================
// Targets
// ============================================================================

/// Why a process was chosen as a termination target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetRole {
    Root,
    CompatLayer,
    Descendant,
}

/// A process selected for termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub pid: u32,
    /// Executable name, when the target was found in the descendant set.
    pub name: Option<String>,
    pub role: TargetRole,
}

impl Target {
    fn root(pid: u32) -> Self {
        Self {
            pid,
            name: None,
            role: TargetRole::Root,
        }
    }
}

/// The targets a policy selected for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationPlan {
    pub shape: TreeShape,
    pub targets: Vec<Target>,
    /// A selected process that was not in the snapshot (already exited).
    ///
    /// It must not be signalled: its pid may belong to another process by now.
    pub absent: Option<Target>,
}

// ============================================================================
// TerminationPolicy
// ============================================================================

/// Classifies trees and picks termination targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationPolicy {
    /// Trees with more descendants than this are fan-out applications.
    pub fan_out_threshold: usize,
    /// Position of the compatibility-layer process in a fan-out tree.
    pub compat_layer_index: usize,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            fan_out_threshold: DEFAULT_FAN_OUT_THRESHOLD,
            compat_layer_index: DEFAULT_COMPAT_LAYER_INDEX,
        }
    }
}

impl TerminationPolicy {
    pub fn new(fan_out_threshold: usize, compat_layer_index: usize) -> Self {
        Self {
            fan_out_threshold,
            compat_layer_index,
        }
    }

    /// Classify a resolved tree by its descendant count.
    pub fn classify(&self, descendants: &DescendantSet) -> TreeShape {
        if descendants.len() > self.fan_out_threshold {
            TreeShape::FanOut
        } else {
            TreeShape::Simple
        }
    }

    /// Select the targets for `mode`. Each pid appears at most once.
    pub fn plan(&self, descendants: &DescendantSet, mode: TerminationMode) -> TerminationPlan {
        let shape = self.classify(descendants);
        let mut plan = TerminationPlan {
            shape,
            targets: Vec::new(),
            absent: None,
        };

        match mode {
            TerminationMode::DirectChild { pid } => match descendants.find(pid) {
                Some(record) => plan.targets.push(Target {
                    pid,
                    name: Some(record.name.clone()),
                    role: TargetRole::Descendant,
                }),
                None => {
                    plan.absent = Some(Target {
                        pid,
                        name: None,
                        role: TargetRole::Descendant,
                    })
                }
            },
            TerminationMode::RootOrCompatLayer => {
                let target = match shape {
                    TreeShape::Simple => Target::root(descendants.root_pid()),
                    TreeShape::FanOut => match descendants.get(self.compat_layer_index) {
                        Some(record) => Target {
                            pid: record.pid,
                            name: Some(record.name.clone()),
                            role: TargetRole::CompatLayer,
                        },
                        None => {
                            tracing::warn!(
                                index = self.compat_layer_index,
                                descendants = descendants.len(),
                                "Compatibility-layer index out of range, falling back to root"
                            );
                            Target::root(descendants.root_pid())
                        }
                    },
                };
                if target.role == TargetRole::Root && !descendants.root_present() {
                    plan.absent = Some(target);
                } else {
                    plan.targets.push(target);
                }
            }
            TerminationMode::AllDescendants => {
                plan.targets = descendants
                    .iter()
                    .map(|record| Target {
                        pid: record.pid,
                        name: Some(record.name.clone()),
                        role: TargetRole::Descendant,
                    })
                    .collect();
            }
        }

        plan
    }
}
