//! Kill command - terminate a process tree.

use anyhow::{bail, Result};
use proctree_core::{ConfigStore, ProcessTreeService, TargetRole, TerminationMode};

use super::output::{print_json, print_report};

pub async fn run(pid: u32, mode: TerminationMode, dry_run: bool, json: bool) -> Result<()> {
    let config = ConfigStore::new()?.load().await?;
    let service = ProcessTreeService::from_config(&config);
    let descendants = service.descendants(pid)?;

    if dry_run {
        let plan = service.policy().plan(&descendants, mode);
        if json {
            return print_json(&plan.targets);
        }
        println!("Tree shape: {}", plan.shape);
        if let Some(absent) = &plan.absent {
            match absent.role {
                TargetRole::Root => println!("Process {} is not running", absent.pid),
                _ => println!("Process {} is not a descendant of {}", absent.pid, pid),
            }
        }
        for target in &plan.targets {
            println!(
                "Would terminate {} ({})",
                target.pid,
                target.name.as_deref().unwrap_or("root")
            );
        }
        return Ok(());
    }

    let report = service.classify_and_terminate(&descendants, mode);

    if json {
        print_json(&report)?;
    } else {
        println!("Tree shape: {}\n", report.shape);
        print_report(&report);
    }

    if !report.is_success() {
        bail!("{} termination(s) denied", report.failures().count());
    }
    Ok(())
}
