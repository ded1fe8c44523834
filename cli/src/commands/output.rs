//! Table and JSON rendering shared by the subcommands.

use proctree_core::{DescendantSet, TerminationPolicy, TerminationReport, TreeShape};
use serde::Serialize;

/// JSON shape of a resolved tree.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeOutput<'a> {
    pub root_pid: u32,
    pub shape: TreeShape,
    pub descendants: &'a DescendantSet,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_tree(descendants: &DescendantSet, shape: TreeShape) {
    let status = if descendants.root_present() {
        ""
    } else {
        " (not running)"
    };
    println!("Root PID: {}{}", descendants.root_pid(), status);
    println!(
        "Snapshot: {}",
        descendants.captured_at().format("%Y-%m-%d %H:%M:%S%.3f UTC")
    );

    if descendants.is_empty() {
        println!("No child processes found (yet)");
        return;
    }

    println!();
    println!("{:<4} {:<8} {:<8} NAME", "#", "PID", "PPID");
    println!("{}", "-".repeat(50));
    for (index, record) in descendants.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:<8} {}",
            index,
            record.pid,
            record.parent_pid,
            truncate(&record.name, 40)
        );
    }
    println!("\nTotal: {} descendants ({})", descendants.len(), shape);
}

/// Warn before termination that the root alone will not stop a fan-out tree.
pub fn print_advisory(descendants: &DescendantSet, shape: TreeShape, policy: &TerminationPolicy) {
    if shape != TreeShape::FanOut {
        return;
    }
    println!(
        "\nMulti-process application detected: terminating the root will not stop it."
    );
    if let Some(record) = descendants.get(policy.compat_layer_index) {
        println!(
            "Terminate the compatibility-layer process instead: {} ({})",
            record.pid,
            record.display_name()
        );
    }
}

pub fn print_report(report: &TerminationReport) {
    if report.attempts.is_empty() {
        println!("Nothing to terminate.");
        return;
    }

    println!("{:<8} {:<12} {:<24} OUTCOME", "PID", "ROLE", "NAME");
    println!("{}", "-".repeat(60));
    for attempt in &report.attempts {
        let role = match attempt.target.role {
            proctree_core::TargetRole::Root => "root",
            proctree_core::TargetRole::CompatLayer => "compat-layer",
            proctree_core::TargetRole::Descendant => "descendant",
        };
        let name = attempt.target.name.as_deref().unwrap_or("-");
        println!(
            "{:<8} {:<12} {:<24} {}",
            attempt.target.pid,
            role,
            truncate(name, 24),
            attempt.outcome
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
